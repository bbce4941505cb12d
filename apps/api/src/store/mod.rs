//! Record store: the only shared resource the version engine touches.
//!
//! Each method is atomic on its own. Nothing here promises atomicity across
//! calls, so callers that issue several writes must tolerate partial failure.
//! The two provided methods (`swap_master`, `delete_if_childless`) have
//! sequential default bodies; backends with real transactions override them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::resume::{NewResumeRow, ResumePatch, ResumeQuery, ResumeRecord};

pub use memory::InMemoryResumeStore;
pub use postgres::PgResumeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result of `ResumeStore::swap_master`.
#[derive(Debug, Clone, Serialize)]
pub struct MasterSwap {
    pub promoted: ResumeRecord,
    /// Records whose demotion write failed. Non-empty means the family may
    /// briefly have more than one master.
    pub failed_demotions: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Uuid),
    HasChildren(usize),
    Missing,
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ResumeRecord>, StoreError>;

    async fn insert(&self, row: NewResumeRow) -> Result<ResumeRecord, StoreError>;

    /// Returns `None` when no row has this id.
    async fn update(
        &self,
        id: Uuid,
        patch: &ResumePatch,
    ) -> Result<Option<ResumeRecord>, StoreError>;

    /// Returns the deleted id, or `None` when no row has this id.
    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// Rows matching the filter, ordered by `version_number` ascending.
    async fn query(&self, filter: ResumeQuery) -> Result<Vec<ResumeRecord>, StoreError>;

    /// Clears `is_master` on every id in `demote`, then sets it on `promote`.
    ///
    /// Demotion failures are logged and collected, never returned as errors.
    /// Returns `Ok(None)` if `promote` no longer exists.
    async fn swap_master(
        &self,
        demote: &[Uuid],
        promote: Uuid,
    ) -> Result<Option<MasterSwap>, StoreError> {
        let mut failed_demotions = Vec::new();
        for &id in demote {
            match self.update(id, &ResumePatch::master(false)).await {
                Ok(Some(_)) => {}
                Ok(None) => warn!("Master demotion skipped: resume {id} no longer exists"),
                Err(e) => {
                    warn!("Master demotion failed for resume {id}: {e}");
                    failed_demotions.push(id);
                }
            }
        }

        Ok(self
            .update(promote, &ResumePatch::master(true))
            .await?
            .map(|promoted| MasterSwap {
                promoted,
                failed_demotions,
            }))
    }

    /// Deletes `id` only if no row has `parent_id = id`.
    async fn delete_if_childless(&self, id: Uuid) -> Result<DeleteOutcome, StoreError> {
        let children = self.query(ResumeQuery::children_of(id)).await?;
        if !children.is_empty() {
            return Ok(DeleteOutcome::HasChildren(children.len()));
        }
        Ok(match self.delete(id).await? {
            Some(deleted) => DeleteOutcome::Deleted(deleted),
            None => DeleteOutcome::Missing,
        })
    }
}
