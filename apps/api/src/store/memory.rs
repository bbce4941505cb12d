//! In-process `ResumeStore`, used by tests and when no `DATABASE_URL` is set.
//!
//! Failure injection lets tests reproduce partial writes: individual rows can
//! be made to reject updates, and the whole store can be taken offline.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::resume::{NewResumeRow, ResumePatch, ResumeQuery, ResumeRecord};
use crate::store::{ResumeStore, StoreError};

#[derive(Default)]
pub struct InMemoryResumeStore {
    rows: Mutex<HashMap<Uuid, ResumeRecord>>,
    failing_updates: Mutex<HashSet<Uuid>>,
    offline: AtomicBool,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `update` of `id` fail with `Unavailable`.
    pub fn fail_updates_for(&self, id: Uuid) {
        if let Ok(mut failing) = self.failing_updates.lock() {
            failing.insert(id);
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> Result<MutexGuard<'_, HashMap<Uuid, ResumeRecord>>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn update_blocked(&self, id: Uuid) -> bool {
        self.failing_updates
            .lock()
            .map(|failing| failing.contains(&id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn get(&self, id: Uuid) -> Result<Option<ResumeRecord>, StoreError> {
        Ok(self.rows()?.get(&id).cloned())
    }

    async fn insert(&self, row: NewResumeRow) -> Result<ResumeRecord, StoreError> {
        let mut rows = self.rows()?;
        if rows.contains_key(&row.id) {
            return Err(StoreError::Conflict(format!("resume {} already exists", row.id)));
        }
        if let Some(parent_id) = row.parent_id {
            if !rows.contains_key(&parent_id) {
                return Err(StoreError::Conflict(format!(
                    "parent resume {parent_id} does not exist"
                )));
            }
        }
        // Mirrors the (COALESCE(parent_id, id), version_number) unique index.
        let family = row.parent_id.unwrap_or(row.id);
        if rows
            .values()
            .any(|r| r.root_id() == family && r.version_number == row.version_number)
        {
            return Err(StoreError::Conflict(format!(
                "version {} already exists in family {family}",
                row.version_number
            )));
        }

        let now = Utc::now();
        let record = ResumeRecord {
            id: row.id,
            user_id: row.user_id,
            display_name: row.display_name,
            description: row.description,
            content: row.content,
            section_config: row.section_config,
            customizations: row.customizations,
            template_id: row.template_id,
            job_id: row.job_id,
            version_number: row.version_number,
            parent_id: row.parent_id,
            is_master: row.is_master,
            created_at: now,
            updated_at: now,
        };
        rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ResumePatch,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        if self.update_blocked(id) {
            return Err(StoreError::Unavailable(format!("update rejected for resume {id}")));
        }
        let mut rows = self.rows()?;
        Ok(rows.get_mut(&id).map(|record| {
            patch.apply_to(record);
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let mut rows = self.rows()?;
        if rows.values().any(|r| r.parent_id == Some(id)) {
            // Same behaviour as the ON DELETE RESTRICT foreign key.
            return Err(StoreError::Conflict(format!(
                "resume {id} is still referenced by other versions"
            )));
        }
        Ok(rows.remove(&id).map(|r| r.id))
    }

    async fn query(&self, filter: ResumeQuery) -> Result<Vec<ResumeRecord>, StoreError> {
        let rows = self.rows()?;
        let mut matched: Vec<ResumeRecord> =
            rows.values().filter(|r| filter.matches(r)).cloned().collect();
        matched.sort_by(|a, b| {
            a.version_number
                .cmp(&b.version_number)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(matched)
    }
}
