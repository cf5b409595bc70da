use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Number,
    Boolean,
    Select,
    Multiselect,
    File,
}

impl QuestionKind {
    pub const ALL: &'static [QuestionKind] = &[
        QuestionKind::Text,
        QuestionKind::Number,
        QuestionKind::Boolean,
        QuestionKind::Select,
        QuestionKind::Multiselect,
        QuestionKind::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Number => "number",
            QuestionKind::Boolean => "boolean",
            QuestionKind::Select => "select",
            QuestionKind::Multiselect => "multiselect",
            QuestionKind::File => "file",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == value)
    }

    pub fn has_options(self) -> bool {
        matches!(self, QuestionKind::Select | QuestionKind::Multiselect)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistQuestion {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub version: i32,
    pub questions: Json<Vec<ChecklistQuestion>>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChecklist {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<ChecklistQuestion>,
    pub is_active: bool,
    pub created_by: Uuid,
}

/// Replacing `questions` bumps the checklist version
#[derive(Debug, Clone, Default)]
pub struct ChecklistChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<ChecklistQuestion>>,
    pub is_active: Option<bool>,
}
