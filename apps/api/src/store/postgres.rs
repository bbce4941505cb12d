use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::resume::{NewResumeRow, ResumePatch, ResumeQuery, ResumeRecord};
use crate::store::{DeleteOutcome, MasterSwap, ResumeStore, StoreError};

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign_key_violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL-backed `ResumeStore`.
///
/// Overrides `swap_master` and `delete_if_childless` so both run inside one
/// transaction instead of the sequential defaults.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::Conflict(db.message().to_string());
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn get(&self, id: Uuid) -> Result<Option<ResumeRecord>, StoreError> {
        sqlx::query_as::<_, ResumeRecord>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn insert(&self, row: NewResumeRow) -> Result<ResumeRecord, StoreError> {
        sqlx::query_as::<_, ResumeRecord>(
            r#"
            INSERT INTO resumes
                (id, user_id, display_name, description, content, section_config,
                 customizations, template_id, job_id, version_number, parent_id, is_master)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.display_name)
        .bind(&row.description)
        .bind(&row.content)
        .bind(&row.section_config)
        .bind(&row.customizations)
        .bind(row.template_id)
        .bind(row.job_id)
        .bind(row.version_number)
        .bind(row.parent_id)
        .bind(row.is_master)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ResumePatch,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        update_with(&self.pool, id, patch).await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Uuid>, StoreError> {
        sqlx::query_scalar::<_, Uuid>("DELETE FROM resumes WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn query(&self, filter: ResumeQuery) -> Result<Vec<ResumeRecord>, StoreError> {
        sqlx::query_as::<_, ResumeRecord>(
            r#"
            SELECT * FROM resumes
            WHERE ($1::uuid IS NULL OR parent_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY version_number ASC, created_at ASC
            "#,
        )
        .bind(filter.parent_id)
        .bind(filter.user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn swap_master(
        &self,
        demote: &[Uuid],
        promote: Uuid,
    ) -> Result<Option<MasterSwap>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let demoted = sqlx::query(
            "UPDATE resumes SET is_master = FALSE, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(demote)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?
        .rows_affected();
        debug!("Demoted {demoted} resume(s) before promoting {promote}");

        let promoted = update_with(&mut *tx, promote, &ResumePatch::master(true)).await?;
        let Some(promoted) = promoted else {
            // Rolled back on drop.
            return Ok(None);
        };

        tx.commit().await.map_err(map_sqlx)?;
        Ok(Some(MasterSwap {
            promoted,
            failed_demotions: Vec::new(),
        }))
    }

    async fn delete_if_childless(&self, id: Uuid) -> Result<DeleteOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // Row lock conflicts with the key-share lock a concurrent child INSERT takes.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM resumes WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        if locked.is_none() {
            return Ok(DeleteOutcome::Missing);
        }

        let children: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE parent_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        if children > 0 {
            return Ok(DeleteOutcome::HasChildren(children as usize));
        }

        sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        tx.commit().await.map_err(map_sqlx)?;

        Ok(DeleteOutcome::Deleted(id))
    }
}

async fn update_with<'e, E>(
    executor: E,
    id: Uuid,
    patch: &ResumePatch,
) -> Result<Option<ResumeRecord>, StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, ResumeRecord>(
        r#"
        UPDATE resumes SET
            display_name   = COALESCE($2, display_name),
            description    = COALESCE($3, description),
            content        = COALESCE($4, content),
            section_config = COALESCE($5, section_config),
            customizations = COALESCE($6, customizations),
            template_id    = COALESCE($7, template_id),
            job_id         = COALESCE($8, job_id),
            is_master      = COALESCE($9, is_master),
            updated_at     = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.display_name)
    .bind(&patch.description)
    .bind(&patch.content)
    .bind(&patch.section_config)
    .bind(&patch.customizations)
    .bind(patch.template_id)
    .bind(patch.job_id)
    .bind(patch.is_master)
    .fetch_optional(executor)
    .await
    .map_err(map_sqlx)
}
