//! Version family resolution.
//!
//! A family is one root (`parent_id = None`) plus every record whose
//! `parent_id` is that root. All reads are scoped to the requesting user; a
//! record owned by someone else is reported as not found.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeQuery, ResumeRecord};
use crate::store::ResumeStore;

#[derive(Debug, Clone, Serialize)]
pub struct Family {
    pub root: ResumeRecord,
    /// Excludes the root. Ordered by `version_number` ascending.
    pub members: Vec<ResumeRecord>,
}

impl Family {
    /// Root first, then members.
    pub fn iter(&self) -> impl Iterator<Item = &ResumeRecord> {
        std::iter::once(&self.root).chain(self.members.iter())
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.iter().map(|r| r.id).collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&ResumeRecord> {
        self.iter().find(|r| r.id == id)
    }

    /// Every record currently flagged as master. More than one means a
    /// demotion write was lost.
    pub fn masters(&self) -> Vec<&ResumeRecord> {
        self.iter().filter(|r| r.is_master).collect()
    }

    pub fn max_version_number(&self) -> i32 {
        self.iter()
            .map(|r| r.version_number)
            .max()
            .unwrap_or(self.root.version_number)
    }
}

/// Fetches `id` and returns it only if it belongs to `user_id`.
pub async fn fetch_owned(
    store: &dyn ResumeStore,
    id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRecord, AppError> {
    store
        .get(id)
        .await?
        .filter(|r| r.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// Resolves the whole family of any member id.
pub async fn resolve_family(
    store: &dyn ResumeStore,
    member_id: Uuid,
    user_id: Uuid,
) -> Result<Family, AppError> {
    let record = fetch_owned(store, member_id, user_id).await?;

    let root = match record.parent_id {
        None => record,
        Some(parent_id) => fetch_owned(store, parent_id, user_id).await?,
    };

    let mut members = store
        .query(ResumeQuery::children_of(root.id).with_user(user_id))
        .await?;
    members.retain(|m| m.id != root.id);
    members.sort_by_key(|m| m.version_number);

    Ok(Family { root, members })
}

/// Version number for the next duplicate: one past the highest number in the
/// family, which is 2 for a lone root numbered 1.
///
/// A root created with a higher number (say 4) gets a first duplicate of 5,
/// not 2, so numbers never collide with the root's.
///
/// Fails with `Validation` once the family has used up `i32::MAX`.
pub fn next_version_number(family: &Family) -> Result<i32, AppError> {
    family.max_version_number().checked_add(1).ok_or_else(|| {
        AppError::Validation(format!(
            "Resume family {} has no version numbers left",
            family.root.id
        ))
    })
}
