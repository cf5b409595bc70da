//! Datastore that delegates to the memory store but fails chosen calls

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use inspection_api::api::{Page, PageRequest};
use inspection_api::database::models::*;
use inspection_api::database::{Datastore, DatabaseError, DbResult, MemoryDatastore};
use inspection_api::rbac::Role;

use super::{spawn_app_over, test_config, TestApp};

pub struct FlakyDatastore {
    inner: Arc<MemoryDatastore>,
    unreadable: Mutex<Vec<Uuid>>,
    escalation_count_down: AtomicBool,
}

impl FlakyDatastore {
    pub fn new(inner: Arc<MemoryDatastore>) -> Self {
        Self {
            inner,
            unreadable: Mutex::new(Vec::new()),
            escalation_count_down: AtomicBool::new(false),
        }
    }

    /// Marking this notification read will fail
    pub fn fail_mark_read(&self, id: Uuid) {
        self.unreadable.lock().expect("lock").push(id);
    }

    pub fn fail_open_escalation_count(&self) {
        self.escalation_count_down.store(true, Ordering::SeqCst);
    }
}

fn outage() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// Test app whose router runs over a [`FlakyDatastore`]
pub async fn spawn_flaky_app() -> (TestApp, Arc<FlakyDatastore>) {
    let mut handle = None;
    let app = spawn_app_over(test_config(), |store| {
        let flaky = Arc::new(FlakyDatastore::new(store));
        handle = Some(flaky.clone());
        flaky as Arc<dyn Datastore>
    })
    .await;
    (app, handle.expect("flaky store"))
}

#[async_trait]
impl Datastore for FlakyDatastore {
    async fn ping(&self) -> DbResult<()> {
        self.inner.ping().await
    }

    async fn create_user(&self, new: NewUser) -> DbResult<User> {
        self.inner.create_user(new).await
    }

    async fn get_user(&self, id: Uuid) -> DbResult<User> {
        self.inner.get_user(id).await
    }

    async fn list_users(&self, role: Option<Role>, page: PageRequest) -> DbResult<Page<User>> {
        self.inner.list_users(role, page).await
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> DbResult<User> {
        self.inner.update_user_role(id, role).await
    }

    async fn existing_user_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>> {
        self.inner.existing_user_ids(ids).await
    }

    async fn active_user_ids(&self, role: Role) -> DbResult<Vec<Uuid>> {
        self.inner.active_user_ids(role).await
    }

    async fn create_project(&self, new: NewProject) -> DbResult<Project> {
        self.inner.create_project(new).await
    }

    async fn get_project(&self, id: Uuid) -> DbResult<Project> {
        self.inner.get_project(id).await
    }

    async fn list_projects(&self, filter: ProjectFilter, page: PageRequest) -> DbResult<Page<Project>> {
        self.inner.list_projects(filter, page).await
    }

    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> DbResult<Project> {
        self.inner.update_project(id, changes).await
    }

    async fn delete_project(&self, id: Uuid) -> DbResult<()> {
        self.inner.delete_project(id).await
    }

    async fn count_projects_by_status(&self) -> DbResult<Vec<StatusCount>> {
        self.inner.count_projects_by_status().await
    }

    async fn create_checklist(&self, new: NewChecklist) -> DbResult<Checklist> {
        self.inner.create_checklist(new).await
    }

    async fn get_checklist(&self, id: Uuid) -> DbResult<Checklist> {
        self.inner.get_checklist(id).await
    }

    async fn list_checklists(
        &self,
        project_id: Uuid,
        active: Option<bool>,
        page: PageRequest,
    ) -> DbResult<Page<Checklist>> {
        self.inner.list_checklists(project_id, active, page).await
    }

    async fn update_checklist(&self, id: Uuid, changes: ChecklistChanges) -> DbResult<Checklist> {
        self.inner.update_checklist(id, changes).await
    }

    async fn delete_checklist(&self, id: Uuid) -> DbResult<()> {
        self.inner.delete_checklist(id).await
    }

    async fn create_inspection(&self, new: NewInspection) -> DbResult<Inspection> {
        self.inner.create_inspection(new).await
    }

    async fn get_inspection(&self, id: Uuid) -> DbResult<Inspection> {
        self.inner.get_inspection(id).await
    }

    async fn list_inspections(&self, filter: InspectionFilter, page: PageRequest) -> DbResult<Page<Inspection>> {
        self.inner.list_inspections(filter, page).await
    }

    async fn update_inspection(&self, id: Uuid, changes: InspectionChanges) -> DbResult<Inspection> {
        self.inner.update_inspection(id, changes).await
    }

    async fn delete_inspection(&self, id: Uuid) -> DbResult<()> {
        self.inner.delete_inspection(id).await
    }

    async fn count_inspections_by_status(&self) -> DbResult<Vec<StatusCount>> {
        self.inner.count_inspections_by_status().await
    }

    async fn create_evidence(&self, new: NewEvidence) -> DbResult<Evidence> {
        self.inner.create_evidence(new).await
    }

    async fn get_evidence(&self, id: Uuid) -> DbResult<Evidence> {
        self.inner.get_evidence(id).await
    }

    async fn list_evidence(&self, inspection_id: Uuid) -> DbResult<Vec<Evidence>> {
        self.inner.list_evidence(inspection_id).await
    }

    async fn evidence_bytes_for_inspection(&self, inspection_id: Uuid) -> DbResult<i64> {
        self.inner.evidence_bytes_for_inspection(inspection_id).await
    }

    async fn total_evidence_bytes(&self) -> DbResult<i64> {
        self.inner.total_evidence_bytes().await
    }

    async fn delete_evidence(&self, id: Uuid) -> DbResult<()> {
        self.inner.delete_evidence(id).await
    }

    async fn record_decision(&self, record: DecisionRecord) -> DbResult<DecisionOutcome> {
        self.inner.record_decision(record).await
    }

    async fn list_approvals(&self, inspection_id: Uuid) -> DbResult<Vec<Approval>> {
        self.inner.list_approvals(inspection_id).await
    }

    async fn create_escalation(&self, new: NewEscalation) -> DbResult<Escalation> {
        self.inner.create_escalation(new).await
    }

    async fn get_escalation(&self, id: Uuid) -> DbResult<Escalation> {
        self.inner.get_escalation(id).await
    }

    async fn list_escalations(&self, filter: EscalationFilter, page: PageRequest) -> DbResult<Page<Escalation>> {
        self.inner.list_escalations(filter, page).await
    }

    async fn update_escalation(&self, id: Uuid, changes: EscalationChanges) -> DbResult<Escalation> {
        self.inner.update_escalation(id, changes).await
    }

    async fn open_escalation_for_inspection(&self, inspection_id: Uuid) -> DbResult<Option<Escalation>> {
        self.inner.open_escalation_for_inspection(inspection_id).await
    }

    async fn count_open_escalations(&self) -> DbResult<i64> {
        if self.escalation_count_down.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.inner.count_open_escalations().await
    }

    async fn create_notification(&self, new: NewNotification) -> DbResult<Notification> {
        self.inner.create_notification(new).await
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> DbResult<Page<Notification>> {
        self.inner.list_notifications(user_id, unread_only, page).await
    }

    async fn unread_notification_ids(&self, user_id: Uuid) -> DbResult<Vec<Uuid>> {
        self.inner.unread_notification_ids(user_id).await
    }

    async fn count_unread_notifications(&self, user_id: Uuid) -> DbResult<i64> {
        self.inner.count_unread_notifications(user_id).await
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> DbResult<Notification> {
        if self.unreadable.lock().expect("lock").contains(&id) {
            return Err(outage());
        }
        self.inner.mark_notification_read(id, user_id).await
    }

    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> DbResult<()> {
        self.inner.delete_notification(id, user_id).await
    }

    async fn append_audit(&self, entry: NewAuditEntry) -> DbResult<()> {
        self.inner.append_audit(entry).await
    }

    async fn list_audit(&self, filter: AuditFilter, page: PageRequest) -> DbResult<Page<AuditLog>> {
        self.inner.list_audit(filter, page).await
    }
}
