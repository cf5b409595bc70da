pub mod approval;
pub mod audit;
pub mod checklist;
pub mod escalation;
pub mod evidence;
pub mod inspection;
pub mod notification;
pub mod project;
pub mod user;

pub use approval::{Approval, Decision, DecisionOutcome, DecisionRecord, NewApproval};
pub use audit::{AuditFilter, AuditLog, NewAuditEntry};
pub use checklist::{Checklist, ChecklistChanges, ChecklistQuestion, NewChecklist, QuestionKind};
pub use escalation::{Escalation, EscalationChanges, EscalationFilter, EscalationStatus, NewEscalation};
pub use evidence::{Evidence, NewEvidence};
pub use inspection::{Inspection, InspectionChanges, InspectionFilter, InspectionStatus, NewInspection};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use project::{NewProject, Project, ProjectChanges, ProjectFilter, ProjectStatus};
pub use user::{NewUser, User};

use serde::Serialize;

/// Row count grouped by a status column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
