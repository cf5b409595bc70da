use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "text", rename_all = "kebab-case")]
pub enum InspectionStatus {
    Draft,
    Pending,
    InReview,
    Approved,
    Rejected,
}

impl InspectionStatus {
    pub const ALL: &'static [InspectionStatus] = &[
        InspectionStatus::Draft,
        InspectionStatus::Pending,
        InspectionStatus::InReview,
        InspectionStatus::Approved,
        InspectionStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InspectionStatus::Draft => "draft",
            InspectionStatus::Pending => "pending",
            InspectionStatus::InReview => "in-review",
            InspectionStatus::Approved => "approved",
            InspectionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Uuid,
    pub project_id: Uuid,
    pub checklist_id: Uuid,
    pub checklist_version: i32,
    pub assigned_to: Uuid,
    pub title: String,
    pub status: InspectionStatus,
    pub rejection_count: i32,
    pub responses: Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInspection {
    pub project_id: Uuid,
    pub checklist_id: Uuid,
    pub assigned_to: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct InspectionChanges {
    pub title: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub status: Option<InspectionStatus>,
    pub rejection_count: Option<i32>,
    pub responses: Option<Value>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct InspectionFilter {
    pub project_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub status: Option<InspectionStatus>,
}
