use async_trait::async_trait;
use uuid::Uuid;

use crate::api::pagination::{Page, PageRequest};
use crate::database::manager::DatabaseError;
use crate::database::models::*;
use crate::rbac::Role;

/// Every datastore operation returns data or an error; nothing panics across this boundary.
pub type DbResult<T> = Result<T, DatabaseError>;

/// One method per domain operation. Single-row lookups return
/// `DatabaseError::NotFound` when the row is missing; dangling foreign keys
/// surface as `DatabaseError::InvalidReference`.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn ping(&self) -> DbResult<()>;

    // Users
    async fn create_user(&self, new: NewUser) -> DbResult<User>;
    async fn get_user(&self, id: Uuid) -> DbResult<User>;
    async fn list_users(&self, role: Option<Role>, page: PageRequest) -> DbResult<Page<User>>;
    async fn update_user_role(&self, id: Uuid, role: Role) -> DbResult<User>;
    /// The subset of `ids` that name existing users
    async fn existing_user_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>>;
    /// Every active user holding `role`, unpaginated
    async fn active_user_ids(&self, role: Role) -> DbResult<Vec<Uuid>>;

    // Projects
    async fn create_project(&self, new: NewProject) -> DbResult<Project>;
    async fn get_project(&self, id: Uuid) -> DbResult<Project>;
    async fn list_projects(&self, filter: ProjectFilter, page: PageRequest) -> DbResult<Page<Project>>;
    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> DbResult<Project>;
    async fn delete_project(&self, id: Uuid) -> DbResult<()>;
    async fn count_projects_by_status(&self) -> DbResult<Vec<StatusCount>>;

    // Checklists
    async fn create_checklist(&self, new: NewChecklist) -> DbResult<Checklist>;
    async fn get_checklist(&self, id: Uuid) -> DbResult<Checklist>;
    async fn list_checklists(
        &self,
        project_id: Uuid,
        active: Option<bool>,
        page: PageRequest,
    ) -> DbResult<Page<Checklist>>;
    async fn update_checklist(&self, id: Uuid, changes: ChecklistChanges) -> DbResult<Checklist>;
    async fn delete_checklist(&self, id: Uuid) -> DbResult<()>;

    // Inspections
    async fn create_inspection(&self, new: NewInspection) -> DbResult<Inspection>;
    async fn get_inspection(&self, id: Uuid) -> DbResult<Inspection>;
    async fn list_inspections(
        &self,
        filter: InspectionFilter,
        page: PageRequest,
    ) -> DbResult<Page<Inspection>>;
    async fn update_inspection(&self, id: Uuid, changes: InspectionChanges) -> DbResult<Inspection>;
    async fn delete_inspection(&self, id: Uuid) -> DbResult<()>;
    async fn count_inspections_by_status(&self) -> DbResult<Vec<StatusCount>>;

    // Evidence
    async fn create_evidence(&self, new: NewEvidence) -> DbResult<Evidence>;
    async fn get_evidence(&self, id: Uuid) -> DbResult<Evidence>;
    async fn list_evidence(&self, inspection_id: Uuid) -> DbResult<Vec<Evidence>>;
    async fn evidence_bytes_for_inspection(&self, inspection_id: Uuid) -> DbResult<i64>;
    async fn total_evidence_bytes(&self) -> DbResult<i64>;
    async fn delete_evidence(&self, id: Uuid) -> DbResult<()>;

    // Approvals
    /// Approval row, inspection status/count and optional escalation in one unit
    async fn record_decision(&self, record: DecisionRecord) -> DbResult<DecisionOutcome>;
    async fn list_approvals(&self, inspection_id: Uuid) -> DbResult<Vec<Approval>>;

    // Escalations
    async fn create_escalation(&self, new: NewEscalation) -> DbResult<Escalation>;
    async fn get_escalation(&self, id: Uuid) -> DbResult<Escalation>;
    async fn list_escalations(
        &self,
        filter: EscalationFilter,
        page: PageRequest,
    ) -> DbResult<Page<Escalation>>;
    async fn update_escalation(&self, id: Uuid, changes: EscalationChanges) -> DbResult<Escalation>;
    async fn open_escalation_for_inspection(&self, inspection_id: Uuid) -> DbResult<Option<Escalation>>;
    async fn count_open_escalations(&self) -> DbResult<i64>;

    // Notifications
    async fn create_notification(&self, new: NewNotification) -> DbResult<Notification>;
    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> DbResult<Page<Notification>>;
    async fn unread_notification_ids(&self, user_id: Uuid) -> DbResult<Vec<Uuid>>;
    async fn count_unread_notifications(&self, user_id: Uuid) -> DbResult<i64>;
    /// Marks one of the user's notifications read; NotFound if it is not theirs
    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> DbResult<Notification>;
    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> DbResult<()>;

    // Audit
    async fn append_audit(&self, entry: NewAuditEntry) -> DbResult<()>;
    async fn list_audit(&self, filter: AuditFilter, page: PageRequest) -> DbResult<Page<AuditLog>>;
}
