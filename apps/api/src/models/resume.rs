use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `resumes` table.
///
/// Every row is either a family root (`parent_id = None`) or a member whose
/// `parent_id` points straight at the root. `content`, `section_config` and
/// `customizations` are opaque documents and are never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub description: Option<String>,
    pub content: Value,
    pub section_config: Value,
    pub customizations: Value,
    pub template_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub version_number: i32,
    pub parent_id: Option<Uuid>,
    pub is_master: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRecord {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Id of the family root this record belongs to.
    pub fn root_id(&self) -> Uuid {
        self.parent_id.unwrap_or(self.id)
    }
}

/// Values for a single INSERT. Timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub description: Option<String>,
    pub content: Value,
    pub section_config: Value,
    pub customizations: Value,
    pub template_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub version_number: i32,
    pub parent_id: Option<Uuid>,
    pub is_master: bool,
}

/// Partial update. `None` leaves the column as it is; there is no way to
/// null a column out through a patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumePatch {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub content: Option<Value>,
    pub section_config: Option<Value>,
    pub customizations: Option<Value>,
    pub template_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub is_master: Option<bool>,
}

impl ResumePatch {
    pub fn master(flag: bool) -> Self {
        Self {
            is_master: Some(flag),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch to an in-memory record. Does not touch timestamps.
    pub fn apply_to(&self, record: &mut ResumeRecord) {
        if let Some(v) = &self.display_name {
            record.display_name = v.clone();
        }
        if let Some(v) = &self.description {
            record.description = Some(v.clone());
        }
        if let Some(v) = &self.content {
            record.content = v.clone();
        }
        if let Some(v) = &self.section_config {
            record.section_config = v.clone();
        }
        if let Some(v) = &self.customizations {
            record.customizations = v.clone();
        }
        if let Some(v) = self.template_id {
            record.template_id = Some(v);
        }
        if let Some(v) = self.job_id {
            record.job_id = Some(v);
        }
        if let Some(v) = self.is_master {
            record.is_master = v;
        }
    }
}

/// Filter for `ResumeStore::query`. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeQuery {
    pub parent_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl ResumeQuery {
    pub fn children_of(parent_id: Uuid) -> Self {
        Self {
            parent_id: Some(parent_id),
            user_id: None,
        }
    }

    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            parent_id: None,
            user_id: Some(user_id),
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn matches(&self, record: &ResumeRecord) -> bool {
        self.parent_id.map_or(true, |p| record.parent_id == Some(p))
            && self.user_id.map_or(true, |u| record.user_id == u)
    }
}
