//! Field-level comparison of two resumes.
//!
//! Structured documents are compared by their serialized form only; the
//! result says *that* they differ, not *how*. Callers wanting a deep diff
//! fetch both records themselves.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::store::ResumeStore;
use crate::versions::family::fetch_owned;

/// Fields covered by `compare_resumes`, in the order details are reported.
pub const TRACKED_FIELDS: &[&str] = &[
    "display_name",
    "description",
    "content",
    "section_config",
    "customizations",
    "template_id",
    "job_id",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldChange {
    /// Scalar field: both values, rendered as strings (`None` for null).
    Changed {
        old: Option<String>,
        new: Option<String>,
    },
    /// Structured field: only the fact that it differs.
    Differs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDifference {
    pub field: &'static str,
    #[serde(flatten)]
    pub change: FieldChange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub display_name: String,
    pub version_number: i32,
    pub parent_id: Option<Uuid>,
    pub is_master: bool,
}

impl From<&ResumeRecord> for ResumeSummary {
    fn from(r: &ResumeRecord) -> Self {
        ResumeSummary {
            id: r.id,
            display_name: r.display_name.clone(),
            version_number: r.version_number,
            parent_id: r.parent_id,
            is_master: r.is_master,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeDiff {
    pub resume_a: ResumeSummary,
    pub resume_b: ResumeSummary,
    /// One entry per tracked field: `true` when A and B differ.
    pub differences: BTreeMap<&'static str, bool>,
    pub details: Vec<FieldDifference>,
    pub has_differences: bool,
}

impl ResumeDiff {
    pub fn differs(&self, field: &str) -> bool {
        self.differences.get(field).copied().unwrap_or(false)
    }
}

/// Fetches both resumes (each scoped to `user_id`) and compares them.
pub async fn compare_resumes(
    store: &dyn ResumeStore,
    id_a: Uuid,
    id_b: Uuid,
    user_id: Uuid,
) -> Result<ResumeDiff, AppError> {
    let a = fetch_owned(store, id_a, user_id).await?;
    let b = fetch_owned(store, id_b, user_id).await?;
    Ok(diff_records(&a, &b))
}

/// Pure comparison of two records.
pub fn diff_records(a: &ResumeRecord, b: &ResumeRecord) -> ResumeDiff {
    let mut diff = DiffBuilder::default();

    diff.scalar(
        "display_name",
        Some(a.display_name.clone()),
        Some(b.display_name.clone()),
    );
    diff.scalar("description", a.description.clone(), b.description.clone());
    diff.structured("content", &a.content, &b.content);
    diff.structured("section_config", &a.section_config, &b.section_config);
    diff.structured("customizations", &a.customizations, &b.customizations);
    diff.scalar(
        "template_id",
        a.template_id.map(|v| v.to_string()),
        b.template_id.map(|v| v.to_string()),
    );
    diff.scalar(
        "job_id",
        a.job_id.map(|v| v.to_string()),
        b.job_id.map(|v| v.to_string()),
    );
    diff.scalar(
        "created_at",
        Some(a.created_at.to_rfc3339()),
        Some(b.created_at.to_rfc3339()),
    );
    diff.scalar(
        "updated_at",
        Some(a.updated_at.to_rfc3339()),
        Some(b.updated_at.to_rfc3339()),
    );

    let has_differences = diff.differences.values().any(|d| *d);
    ResumeDiff {
        resume_a: a.into(),
        resume_b: b.into(),
        differences: diff.differences,
        details: diff.details,
        has_differences,
    }
}

#[derive(Default)]
struct DiffBuilder {
    differences: BTreeMap<&'static str, bool>,
    details: Vec<FieldDifference>,
}

impl DiffBuilder {
    fn scalar(&mut self, field: &'static str, old: Option<String>, new: Option<String>) {
        let differs = old != new;
        self.differences.insert(field, differs);
        if differs {
            self.details.push(FieldDifference {
                field,
                change: FieldChange::Changed { old, new },
            });
        }
    }

    fn structured(&mut self, field: &'static str, left: &Value, right: &Value) {
        let differs = serialized(left) != serialized(right);
        self.differences.insert(field, differs);
        if differs {
            self.details.push(FieldDifference {
                field,
                change: FieldChange::Differs,
            });
        }
    }
}

/// Serialize-then-compare; `Value` serialization is deterministic for a
/// given document.
fn serialized(value: &Value) -> String {
    value.to_string()
}
