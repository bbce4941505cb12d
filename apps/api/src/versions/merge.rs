//! Last-write-wins field merge between two resumes.
//!
//! Listed fields that carry a value on the source overwrite the target in a
//! single update. Empty source values never null out the target.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumePatch, ResumeRecord};
use crate::store::ResumeStore;
use crate::versions::family::fetch_owned;
use crate::versions::lifecycle::validate_lengths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeField {
    #[serde(alias = "displayName")]
    DisplayName,
    Description,
    Content,
    #[serde(alias = "sectionConfig")]
    SectionConfig,
    Customizations,
    #[serde(alias = "templateId")]
    TemplateId,
    #[serde(alias = "jobId")]
    JobId,
}

/// Fields merged when the caller does not name any.
pub const DEFAULT_MERGE_FIELDS: &[MergeField] = &[
    MergeField::Content,
    MergeField::SectionConfig,
    MergeField::Customizations,
];

#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    pub target: ResumeRecord,
    pub source: ResumeRecord,
    /// Fields actually copied, in request order, without repeats.
    pub merged_fields: Vec<MergeField>,
}

/// Copies `fields` from `source_id` onto `target_id`.
pub async fn merge_resumes(
    store: &dyn ResumeStore,
    target_id: Uuid,
    source_id: Uuid,
    user_id: Uuid,
    fields: &[MergeField],
) -> Result<MergeResult, AppError> {
    let target = fetch_owned(store, target_id, user_id).await?;
    let source = fetch_owned(store, source_id, user_id).await?;

    let (patch, merged_fields) = build_merge_patch(&source, fields);
    if merged_fields.is_empty() {
        return Ok(MergeResult {
            target,
            source,
            merged_fields,
        });
    }
    validate_lengths(patch.display_name.as_deref(), patch.description.as_deref())?;

    let target = store
        .update(target_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {target_id} not found")))?;

    info!(
        "Merged {:?} from resume {} into {} for user {}",
        merged_fields, source_id, target_id, user_id
    );
    Ok(MergeResult {
        target,
        source,
        merged_fields,
    })
}

/// Builds the patch for the non-empty listed fields of `source`.
pub fn build_merge_patch(
    source: &ResumeRecord,
    fields: &[MergeField],
) -> (ResumePatch, Vec<MergeField>) {
    let mut patch = ResumePatch::default();
    let mut merged = Vec::new();

    for &field in fields {
        if merged.contains(&field) {
            continue;
        }
        let copied = match field {
            MergeField::DisplayName => {
                copy_text(&mut patch.display_name, Some(source.display_name.as_str()))
            }
            MergeField::Description => {
                copy_text(&mut patch.description, source.description.as_deref())
            }
            MergeField::Content => copy_document(&mut patch.content, &source.content),
            MergeField::SectionConfig => {
                copy_document(&mut patch.section_config, &source.section_config)
            }
            MergeField::Customizations => {
                copy_document(&mut patch.customizations, &source.customizations)
            }
            MergeField::TemplateId => copy_id(&mut patch.template_id, source.template_id),
            MergeField::JobId => copy_id(&mut patch.job_id, source.job_id),
        };
        if copied {
            merged.push(field);
        }
    }

    (patch, merged)
}

fn copy_text(slot: &mut Option<String>, value: Option<&str>) -> bool {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => {
            *slot = Some(v.to_string());
            true
        }
        None => false,
    }
}

fn copy_document(slot: &mut Option<Value>, value: &Value) -> bool {
    if is_empty_document(value) {
        return false;
    }
    *slot = Some(value.clone());
    true
}

fn copy_id(slot: &mut Option<Uuid>, value: Option<Uuid>) -> bool {
    *slot = value;
    value.is_some()
}

/// Null, a blank string, `{}` and `[]` count as empty.
fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RandomIds;
    use crate::models::resume::NewResumeRow;
    use crate::store::InMemoryResumeStore;
    use crate::versions::lifecycle::{create_resume, NewResume};
    use serde_json::json;

    async fn pair(
        store: &InMemoryResumeStore,
        user: Uuid,
        target: NewResume,
        source: NewResume,
    ) -> (ResumeRecord, ResumeRecord) {
        let target = create_resume(store, &RandomIds, user, target).await.unwrap();
        let source = create_resume(store, &RandomIds, user, source).await.unwrap();
        (target, source)
    }

    #[tokio::test]
    async fn test_empty_source_name_is_not_merged() {
        let store = InMemoryResumeStore::new();
        let user = Uuid::new_v4();
        let target = create_resume(
            &store,
            &RandomIds,
            user,
            NewResume {
                display_name: Some("Target".to_string()),
                ..NewResume::default()
            },
        )
        .await
        .unwrap();
        // create() never stores a blank name, so write the row directly.
        let source = store
            .insert(NewResumeRow {
                id: Uuid::new_v4(),
                user_id: user,
                display_name: String::new(),
                description: None,
                content: json!({}),
                section_config: json!({}),
                customizations: json!({}),
                template_id: None,
                job_id: None,
                version_number: 1,
                parent_id: None,
                is_master: false,
            })
            .await
            .unwrap();

        let result = merge_resumes(
            &store,
            target.id,
            source.id,
            user,
            &[MergeField::DisplayName],
        )
        .await
        .unwrap();
        assert_eq!(result.target.display_name, "Target");
        assert_eq!(result.target.updated_at, target.updated_at);
        assert!(result.merged_fields.is_empty());
    }

    #[tokio::test]
    async fn test_default_fields_copy_documents() {
        let store = InMemoryResumeStore::new();
        let user = Uuid::new_v4();
        let (target, source) = pair(
            &store,
            user,
            NewResume {
                display_name: Some("Target".to_string()),
                content: Some(json!({"summary": "old"})),
                ..NewResume::default()
            },
            NewResume {
                display_name: Some("Source".to_string()),
                content: Some(json!({"summary": "new"})),
                customizations: Some(json!({"accent": "#224466"})),
                ..NewResume::default()
            },
        )
        .await;

        let result = merge_resumes(&store, target.id, source.id, user, DEFAULT_MERGE_FIELDS)
            .await
            .unwrap();
        assert_eq!(result.target.content, json!({"summary": "new"}));
        assert_eq!(result.target.customizations, json!({"accent": "#224466"}));
        assert_eq!(result.target.display_name, "Target");
        // section_config is `{}` on the source, so it is skipped.
        assert_eq!(
            result.merged_fields,
            vec![MergeField::Content, MergeField::Customizations]
        );
        assert_eq!(result.source, source);
    }

    #[tokio::test]
    async fn test_merge_scalar_fields() {
        let store = InMemoryResumeStore::new();
        let user = Uuid::new_v4();
        let job = Uuid::new_v4();
        let (target, source) = pair(
            &store,
            user,
            NewResume {
                description: Some("keep me".to_string()),
                ..NewResume::default()
            },
            NewResume {
                display_name: Some("Source".to_string()),
                job_id: Some(job),
                ..NewResume::default()
            },
        )
        .await;

        let result = merge_resumes(
            &store,
            target.id,
            source.id,
            user,
            &[
                MergeField::DisplayName,
                MergeField::Description,
                MergeField::JobId,
                MergeField::TemplateId,
            ],
        )
        .await
        .unwrap();
        assert_eq!(result.target.display_name, "Source");
        assert_eq!(result.target.job_id, Some(job));
        assert_eq!(result.target.description.as_deref(), Some("keep me"));
        assert_eq!(
            result.merged_fields,
            vec![MergeField::DisplayName, MergeField::JobId]
        );
    }

    #[tokio::test]
    async fn test_merge_missing_record_is_not_found() {
        let store = InMemoryResumeStore::new();
        let user = Uuid::new_v4();
        let target = create_resume(&store, &RandomIds, user, NewResume::default())
            .await
            .unwrap();
        let err = merge_resumes(
            &store,
            target.id,
            Uuid::new_v4(),
            user,
            DEFAULT_MERGE_FIELDS,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = merge_resumes(
            &store,
            target.id,
            target.id,
            Uuid::new_v4(),
            DEFAULT_MERGE_FIELDS,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_repeated_fields_are_merged_once() {
        let now = chrono::Utc::now();
        let source = ResumeRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: "Source".to_string(),
            description: None,
            content: json!({"a": 1}),
            section_config: json!({}),
            customizations: json!({}),
            template_id: None,
            job_id: None,
            version_number: 1,
            parent_id: None,
            is_master: false,
            created_at: now,
            updated_at: now,
        };
        let (_, merged) =
            build_merge_patch(&source, &[MergeField::Content, MergeField::Content]);
        assert_eq!(merged, vec![MergeField::Content]);
    }

    #[test]
    fn test_empty_documents() {
        assert!(is_empty_document(&Value::Null));
        assert!(is_empty_document(&json!("  ")));
        assert!(is_empty_document(&json!({})));
        assert!(is_empty_document(&json!([])));
        assert!(!is_empty_document(&json!(false)));
        assert!(!is_empty_document(&json!(0)));
        assert!(!is_empty_document(&json!({"k": null})));
    }

    #[test]
    fn test_field_names_accept_both_casings() {
        let fields: Vec<MergeField> =
            serde_json::from_value(json!(["displayName", "section_config", "content"])).unwrap();
        assert_eq!(
            fields,
            vec![
                MergeField::DisplayName,
                MergeField::SectionConfig,
                MergeField::Content
            ]
        );
        assert!(serde_json::from_value::<MergeField>(json!("is_master")).is_err());
    }
}
