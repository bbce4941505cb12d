//! Axum route handlers for the resume versions API.
//!
//! Authentication is handled upstream; the owning user arrives as `user_id`
//! in the query string or request body.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::state::AppState;
use crate::store::MasterSwap;
use crate::versions::diff::{compare_resumes, ResumeDiff};
use crate::versions::lifecycle::{
    create_resume, delete_resume, duplicate_resume, get_family, get_resume, list_resumes,
    set_master, update_resume, DeletedResume, FamilyView, NewResume, ResumeEdit,
};
use crate::versions::merge::{merge_resumes, MergeField, MergeResult, DEFAULT_MERGE_FIELDS};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: NewResume,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub edit: ResumeEdit,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
    pub user_id: Uuid,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetMasterRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub user_id: Uuid,
    pub source_id: Uuid,
    pub fields: Option<Vec<MergeField>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    let record = create_resume(
        state.store.as_ref(),
        state.ids.as_ref(),
        req.user_id,
        req.fields,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    let records = list_resumes(state.store.as_ref(), params.user_id).await?;
    Ok(Json(records))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = get_resume(state.store.as_ref(), id, params.user_id).await?;
    Ok(Json(record))
}

/// PATCH /api/v1/resumes/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = update_resume(state.store.as_ref(), id, req.user_id, req.edit).await?;
    Ok(Json(record))
}

/// DELETE /api/v1/resumes/:id
///
/// Refused with 409 while other versions still point at this resume.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DeletedResume>, AppError> {
    let deleted = delete_resume(state.store.as_ref(), id, params.user_id).await?;
    Ok(Json(deleted))
}

/// GET /api/v1/resumes/:id/versions
pub async fn handle_family(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FamilyView>, AppError> {
    let family = get_family(state.store.as_ref(), id, params.user_id).await?;
    Ok(Json(family))
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DuplicateRequest>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    let record = duplicate_resume(
        state.store.as_ref(),
        state.ids.as_ref(),
        id,
        req.user_id,
        req.display_name.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/v1/resumes/:id/master
pub async fn handle_set_master(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetMasterRequest>,
) -> Result<Json<MasterSwap>, AppError> {
    let swap = set_master(state.store.as_ref(), id, req.user_id).await?;
    Ok(Json(swap))
}

/// GET /api/v1/resumes/:id/compare/:other_id
pub async fn handle_compare(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeDiff>, AppError> {
    let diff = compare_resumes(state.store.as_ref(), id, other_id, params.user_id).await?;
    Ok(Json(diff))
}

/// POST /api/v1/resumes/:id/merge
///
/// Copies fields from `source_id` into `:id`. Without `fields`, merges the
/// document fields (content, section config, customizations).
pub async fn handle_merge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<MergeResult>, AppError> {
    let fields = req.fields.as_deref().unwrap_or(DEFAULT_MERGE_FIELDS);
    let merge = merge_resumes(state.store.as_ref(), id, req.source_id, req.user_id, fields).await?;
    Ok(Json(merge))
}
