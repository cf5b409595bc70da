use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Escalation, Inspection, InspectionStatus, NewEscalation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(Decision::Approved),
            "rejected" => Some(Decision::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub manager_id: Uuid,
    pub decision: Decision,
    pub notes: Option<String>,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApproval {
    pub inspection_id: Uuid,
    pub manager_id: Uuid,
    pub decision: Decision,
    pub notes: Option<String>,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
}

/// A decision and everything it changes, applied atomically.
///
/// The inspection update only lands if the row still has the status and
/// rejection count the decision was planned against; otherwise the store
/// returns `DatabaseError::Conflict`.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    pub approval: NewApproval,
    pub expected_status: InspectionStatus,
    pub expected_rejection_count: i32,
    pub next_status: InspectionStatus,
    pub next_rejection_count: i32,
    pub escalation: Option<NewEscalation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOutcome {
    pub approval: Approval,
    pub inspection: Inspection,
    pub escalation: Option<Escalation>,
}
