//! Field definitions a client needs to render a project's boards.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use uuid::Uuid;

use super::taxonomy::TaxonomyItemResponse;
use crate::database::models::Project;
use crate::types::{BoardImportance, BoardRole, BoardStage};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub option_id: String,
    pub option_label: String,
    pub option_value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub field_id: String,
    pub field_name: String,
    pub field_type: String,
    pub is_required: bool,
    pub options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeInfo {
    pub type_id: String,
    pub type_name: String,
    pub description: String,
}

fn option(value: &str, label: &str) -> FieldOption {
    FieldOption {
        option_id: value.to_string(),
        option_label: label.to_string(),
        option_value: value.to_string(),
    }
}

fn select(field_id: &str, field_name: &str, options: Vec<FieldOption>, description: &str) -> FieldDefinition {
    FieldDefinition {
        field_id: field_id.to_string(),
        field_name: field_name.to_string(),
        field_type: "select".to_string(),
        is_required: true,
        options,
        description: Some(description.to_string()),
    }
}

fn label_for(value: &str) -> String {
    let mut label = value.replace('_', " ");
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    label
}

pub static BOARD_FIELDS: Lazy<Vec<FieldDefinition>> = Lazy::new(|| {
    vec![
        select(
            "stage",
            "Stage",
            BoardStage::ALL.iter().map(|s| option(s.as_str(), &label_for(s.as_str()))).collect(),
            "Progress stage of the board",
        ),
        select(
            "importance",
            "Importance",
            BoardImportance::ALL
                .iter()
                .map(|i| option(i.as_str(), &label_for(i.as_str())))
                .collect(),
            "How urgent the board is",
        ),
        select(
            "role",
            "Role",
            BoardRole::ALL.iter().map(|r| option(r.as_str(), &label_for(r.as_str()))).collect(),
            "Role responsible for the board",
        ),
    ]
});

pub static FIELD_TYPES: Lazy<Vec<FieldTypeInfo>> = Lazy::new(|| {
    [
        ("select", "Select", "Single choice from a fixed list"),
        ("text", "Text", "Free text"),
        ("date", "Date", "Calendar date"),
        ("user", "User", "Reference to a project member"),
    ]
    .iter()
    .map(|(id, name, description)| FieldTypeInfo {
        type_id: id.to_string(),
        type_name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBasicInfo {
    pub project_id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectBasicInfo {
    fn from(project: &Project) -> Self {
        Self {
            project_id: project.id,
            workspace_id: project.workspace_id,
            name: project.name.clone(),
            description: project.description.clone(),
            owner_id: project.owner_id,
            is_public: project.is_public,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTaxonomies {
    pub stages: Vec<TaxonomyItemResponse>,
    pub roles: Vec<TaxonomyItemResponse>,
    pub importances: Vec<TaxonomyItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInitSettingsResponse {
    pub project: ProjectBasicInfo,
    pub fields: Vec<FieldDefinition>,
    pub field_types: Vec<FieldTypeInfo>,
    pub custom: CustomTaxonomies,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_fields_cover_every_classification_value() {
        let stage = BOARD_FIELDS.iter().find(|f| f.field_id == "stage").unwrap();
        let values: Vec<&str> = stage.options.iter().map(|o| o.option_value.as_str()).collect();
        assert_eq!(values, ["in_progress", "pending", "approved", "review"]);
        assert_eq!(stage.options[0].option_label, "In progress");
        assert_eq!(BOARD_FIELDS.len(), 3);
    }

    #[test]
    fn field_types_are_listed() {
        let ids: Vec<&str> = FIELD_TYPES.iter().map(|t| t.type_id.as_str()).collect();
        assert_eq!(ids, ["select", "text", "date", "user"]);
    }
}
