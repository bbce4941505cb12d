//! Resume lifecycle: create, duplicate, set master, delete, plus plain reads
//! and in-place edits.
//!
//! Every operation is a short sequence of independent store calls. None of
//! them is wrapped in a transaction here, so each is ordered such that a
//! failure part-way leaves parent links intact: `create` and `duplicate` do a
//! single insert, `set_master` demotes before it promotes, and `delete` checks
//! for children before removing anything.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::models::resume::{NewResumeRow, ResumePatch, ResumeQuery, ResumeRecord};
use crate::store::{DeleteOutcome, MasterSwap, ResumeStore};
use crate::versions::family::{fetch_owned, next_version_number, resolve_family, Family};
use crate::versions::naming::version_display_name;

pub const DEFAULT_DISPLAY_NAME: &str = "New_Resume";
pub const MAX_DISPLAY_NAME_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

// ────────────────────────────────────────────────────────────────────────────
// Inputs / outputs
// ────────────────────────────────────────────────────────────────────────────

/// Fields accepted when creating a new family root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewResume {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub content: Option<Value>,
    pub section_config: Option<Value>,
    pub customizations: Option<Value>,
    pub template_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub version_number: Option<i32>,
    pub is_master: Option<bool>,
}

/// In-place edits. Family structure (`parent_id`, `version_number`,
/// `is_master`) is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeEdit {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub content: Option<Value>,
    pub section_config: Option<Value>,
    pub customizations: Option<Value>,
    pub template_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
}

impl From<ResumeEdit> for ResumePatch {
    fn from(edit: ResumeEdit) -> Self {
        ResumePatch {
            display_name: edit.display_name,
            description: edit.description,
            content: edit.content,
            section_config: edit.section_config,
            customizations: edit.customizations,
            template_id: edit.template_id,
            job_id: edit.job_id,
            is_master: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedResume {
    pub id: Uuid,
}

/// A family as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyView {
    pub root: ResumeRecord,
    pub members: Vec<ResumeRecord>,
    pub master_id: Option<Uuid>,
}

impl From<Family> for FamilyView {
    fn from(family: Family) -> Self {
        let master_id = family.masters().first().map(|r| r.id);
        FamilyView {
            root: family.root,
            members: family.members,
            master_id,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Enforces the column length limits before anything reaches the store.
pub fn validate_lengths(
    display_name: Option<&str>,
    description: Option<&str>,
) -> Result<(), AppError> {
    if let Some(name) = display_name {
        let len = name.chars().count();
        if len > MAX_DISPLAY_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "display_name must be at most {MAX_DISPLAY_NAME_CHARS} characters (got {len})"
            )));
        }
    }
    if let Some(description) = description {
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters (got {len})"
            )));
        }
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Creates a new family root.
pub async fn create_resume(
    store: &dyn ResumeStore,
    ids: &dyn IdGenerator,
    user_id: Uuid,
    fields: NewResume,
) -> Result<ResumeRecord, AppError> {
    validate_lengths(
        fields.display_name.as_deref(),
        fields.description.as_deref(),
    )?;

    let version_number = fields.version_number.unwrap_or(1);
    if version_number < 1 {
        return Err(AppError::Validation(format!(
            "version_number must be positive (got {version_number})"
        )));
    }

    let display_name = non_blank(fields.display_name.as_deref())
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string();

    let record = store
        .insert(NewResumeRow {
            id: ids.next_id(),
            user_id,
            display_name,
            description: fields.description,
            content: fields.content.unwrap_or_else(|| json!({})),
            section_config: fields.section_config.unwrap_or_else(|| json!({})),
            customizations: fields.customizations.unwrap_or_else(|| json!({})),
            template_id: fields.template_id,
            job_id: fields.job_id,
            version_number,
            parent_id: None,
            is_master: fields.is_master.unwrap_or(false),
        })
        .await?;

    info!(
        "Created resume {} (v{}) for user {}",
        record.id, record.version_number, user_id
    );
    Ok(record)
}

/// Copies `source_id` into a new member of its family.
///
/// The copy takes the source's content, even when the source is an older
/// member, but is always parented to the family root.
pub async fn duplicate_resume(
    store: &dyn ResumeStore,
    ids: &dyn IdGenerator,
    source_id: Uuid,
    user_id: Uuid,
    override_name: Option<&str>,
) -> Result<ResumeRecord, AppError> {
    let override_name = non_blank(override_name);
    validate_lengths(override_name, None)?;

    let family = resolve_family(store, source_id, user_id).await?;
    let source = family
        .get(source_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Resume {source_id} not found")))?;

    let version_number = next_version_number(&family)?;
    let display_name = match override_name {
        Some(name) => name.to_string(),
        None => version_display_name(&source.display_name, version_number, MAX_DISPLAY_NAME_CHARS),
    };

    let record = store
        .insert(NewResumeRow {
            id: ids.next_id(),
            user_id,
            display_name,
            description: source.description,
            content: source.content,
            section_config: source.section_config,
            customizations: source.customizations,
            template_id: source.template_id,
            job_id: source.job_id,
            version_number,
            parent_id: Some(family.root.id),
            is_master: false,
        })
        .await?;

    info!(
        "Duplicated resume {} into {} (v{}, root {}) for user {}",
        source_id, record.id, record.version_number, family.root.id, user_id
    );
    Ok(record)
}

/// Makes `target_id` the single master of its family.
///
/// Other masters are demoted first. A demotion that fails is logged and
/// reported in `failed_demotions` but does not stop the promotion.
pub async fn set_master(
    store: &dyn ResumeStore,
    target_id: Uuid,
    user_id: Uuid,
) -> Result<MasterSwap, AppError> {
    let family = resolve_family(store, target_id, user_id).await?;

    let demote: Vec<Uuid> = family
        .masters()
        .into_iter()
        .filter(|r| r.id != target_id)
        .map(|r| r.id)
        .collect();

    let swap = store
        .swap_master(&demote, target_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {target_id} not found")))?;

    if !swap.failed_demotions.is_empty() {
        warn!(
            "Resume {} promoted to master but {} previous master(s) could not be demoted: {:?}",
            target_id,
            swap.failed_demotions.len(),
            swap.failed_demotions
        );
    }
    info!(
        "Resume {} is now master of family {} for user {}",
        target_id, family.root.id, user_id
    );
    Ok(swap)
}

/// Deletes a resume that no other version points at.
pub async fn delete_resume(
    store: &dyn ResumeStore,
    target_id: Uuid,
    user_id: Uuid,
) -> Result<DeletedResume, AppError> {
    fetch_owned(store, target_id, user_id).await?;

    match store.delete_if_childless(target_id).await? {
        DeleteOutcome::Deleted(id) => {
            info!("Deleted resume {id} for user {user_id}");
            Ok(DeletedResume { id })
        }
        DeleteOutcome::HasChildren(count) => Err(AppError::HasChildren { count }),
        DeleteOutcome::Missing => Err(AppError::NotFound(format!("Resume {target_id} not found"))),
    }
}

pub async fn get_resume(
    store: &dyn ResumeStore,
    id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRecord, AppError> {
    fetch_owned(store, id, user_id).await
}

/// All of a user's resumes, oldest first.
pub async fn list_resumes(
    store: &dyn ResumeStore,
    user_id: Uuid,
) -> Result<Vec<ResumeRecord>, AppError> {
    let mut records = store.query(ResumeQuery::owned_by(user_id)).await?;
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(records)
}

pub async fn get_family(
    store: &dyn ResumeStore,
    id: Uuid,
    user_id: Uuid,
) -> Result<FamilyView, AppError> {
    Ok(resolve_family(store, id, user_id).await?.into())
}

/// Applies in-place field edits to one resume.
pub async fn update_resume(
    store: &dyn ResumeStore,
    id: Uuid,
    user_id: Uuid,
    edit: ResumeEdit,
) -> Result<ResumeRecord, AppError> {
    validate_lengths(edit.display_name.as_deref(), edit.description.as_deref())?;
    if edit
        .display_name
        .as_deref()
        .is_some_and(|n| n.trim().is_empty())
    {
        return Err(AppError::Validation("display_name cannot be empty".to_string()));
    }

    let existing = fetch_owned(store, id, user_id).await?;
    let patch = ResumePatch::from(edit);
    if patch.is_empty() {
        return Ok(existing);
    }

    let record = store
        .update(id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    info!("Updated resume {id} for user {user_id}");
    Ok(record)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
