use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscalationStatus {
    Queued,
    Notified,
    Resolved,
    Expired,
}

impl EscalationStatus {
    pub const ALL: &'static [EscalationStatus] = &[
        EscalationStatus::Queued,
        EscalationStatus::Notified,
        EscalationStatus::Resolved,
        EscalationStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EscalationStatus::Queued => "QUEUED",
            EscalationStatus::Notified => "NOTIFIED",
            EscalationStatus::Resolved => "RESOLVED",
            EscalationStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(value))
    }

    /// Still awaiting action (not resolved or expired)
    pub fn is_open(self) -> bool {
        matches!(self, EscalationStatus::Queued | EscalationStatus::Notified)
    }
}

impl std::fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub original_manager_id: Uuid,
    pub new_manager_id: Option<Uuid>,
    pub reason: String,
    pub status: EscalationStatus,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewEscalation {
    pub inspection_id: Uuid,
    pub original_manager_id: Uuid,
    pub new_manager_id: Option<Uuid>,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct EscalationChanges {
    pub status: EscalationStatus,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct EscalationFilter {
    pub status: Option<EscalationStatus>,
    pub inspection_id: Option<Uuid>,
}
