use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::pagination::{Page, PageRequest};
use crate::database::manager::DatabaseError;
use crate::database::models::*;
use crate::database::store::{Datastore, DbResult};
use crate::rbac::Role;

/// In-process datastore for tests and `STORAGE_BACKEND=memory` runs.
///
/// Mirrors the Postgres schema's constraints: unknown references fail with
/// `InvalidReference`, restricted deletes refuse while rows still point at
/// the target, and inspection children cascade. Rows are kept in insertion
/// order so "newest first" is a reverse scan.
#[derive(Default)]
pub struct MemoryDatastore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    checklists: Vec<Checklist>,
    inspections: Vec<Inspection>,
    evidence: Vec<Evidence>,
    approvals: Vec<Approval>,
    escalations: Vec<Escalation>,
    notifications: Vec<Notification>,
    audit: Vec<AuditLog>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn require_user(&self, id: Uuid, field: &str) -> DbResult<()> {
        if self.user_exists(id) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidReference(format!("{} refers to an unknown user", field)))
        }
    }

    fn require_inspection(&self, id: Uuid) -> DbResult<()> {
        if self.inspections.iter().any(|i| i.id == id) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidReference("inspection does not exist".to_string()))
        }
    }
}

fn paginate<T: Clone + serde::Serialize>(rows: Vec<T>, page: PageRequest) -> Page<T> {
    let total = rows.len() as i64;
    Page::new(page.slice(&rows), page, total)
}

fn count_by<T>(rows: &[T], status: impl Fn(&T) -> &'static str) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = Vec::new();
    for row in rows {
        let key = status(row);
        match counts.iter_mut().find(|c| c.status == key) {
            Some(c) => c.count += 1,
            None => counts.push(StatusCount {
                status: key.to_string(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| a.status.cmp(&b.status));
    counts
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }

    // Users

    async fn create_user(&self, new: NewUser) -> DbResult<User> {
        let mut t = self.tables.write().await;
        let id = new.id.unwrap_or_else(Uuid::new_v4);
        if t.users.iter().any(|u| u.id == id || u.email.eq_ignore_ascii_case(&new.email)) {
            return Err(DatabaseError::Conflict(format!("user {} already exists", new.email)));
        }
        let now = Utc::now();
        let user = User {
            id,
            email: new.email,
            full_name: new.full_name,
            role: new.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> DbResult<User> {
        let t = self.tables.read().await;
        t.users.iter().find(|u| u.id == id).cloned().ok_or(DatabaseError::NotFound("User"))
    }

    async fn list_users(&self, role: Option<Role>, page: PageRequest) -> DbResult<Page<User>> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t
            .users
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(paginate(users, page))
    }

    async fn existing_user_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>> {
        let t = self.tables.read().await;
        Ok(ids.iter().copied().filter(|id| t.user_exists(*id)).collect())
    }

    async fn active_user_ids(&self, role: Role) -> DbResult<Vec<Uuid>> {
        let t = self.tables.read().await;
        Ok(t.users
            .iter()
            .filter(|u| u.role == role && u.is_active)
            .map(|u| u.id)
            .collect())
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> DbResult<User> {
        let mut t = self.tables.write().await;
        let user = t.users.iter_mut().find(|u| u.id == id).ok_or(DatabaseError::NotFound("User"))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    // Projects

    async fn create_project(&self, new: NewProject) -> DbResult<Project> {
        let mut t = self.tables.write().await;
        t.require_user(new.owner_id, "ownerId")?;
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            status: new.status,
            start_date: new.start_date,
            end_date: new.end_date,
            latitude: new.latitude,
            longitude: new.longitude,
            address: new.address,
            team_members: new.team_members,
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        };
        t.projects.push(project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> DbResult<Project> {
        let t = self.tables.read().await;
        t.projects.iter().find(|p| p.id == id).cloned().ok_or(DatabaseError::NotFound("Project"))
    }

    async fn list_projects(&self, filter: ProjectFilter, page: PageRequest) -> DbResult<Page<Project>> {
        let t = self.tables.read().await;
        let projects = t
            .projects
            .iter()
            .rev()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| filter.member.map_or(true, |m| p.has_member(m)))
            .cloned()
            .collect();
        Ok(paginate(projects, page))
    }

    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> DbResult<Project> {
        let mut t = self.tables.write().await;
        let project = t.projects.iter_mut().find(|p| p.id == id).ok_or(DatabaseError::NotFound("Project"))?;
        if let Some(v) = changes.name {
            project.name = v;
        }
        if let Some(v) = changes.description {
            project.description = Some(v);
        }
        if let Some(v) = changes.status {
            project.status = v;
        }
        if let Some(v) = changes.start_date {
            project.start_date = v;
        }
        if let Some(v) = changes.end_date {
            project.end_date = v;
        }
        if let Some(v) = changes.latitude {
            project.latitude = Some(v);
        }
        if let Some(v) = changes.longitude {
            project.longitude = Some(v);
        }
        if let Some(v) = changes.address {
            project.address = Some(v);
        }
        if let Some(v) = changes.team_members {
            project.team_members = v;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> DbResult<()> {
        let mut t = self.tables.write().await;
        if !t.projects.iter().any(|p| p.id == id) {
            return Err(DatabaseError::NotFound("Project"));
        }
        if t.inspections.iter().any(|i| i.project_id == id) {
            return Err(DatabaseError::InvalidReference(
                "project still has inspections".to_string(),
            ));
        }
        t.checklists.retain(|c| c.project_id != id);
        t.projects.retain(|p| p.id != id);
        Ok(())
    }

    async fn count_projects_by_status(&self) -> DbResult<Vec<StatusCount>> {
        let t = self.tables.read().await;
        Ok(count_by(&t.projects, |p| p.status.as_str()))
    }

    // Checklists

    async fn create_checklist(&self, new: NewChecklist) -> DbResult<Checklist> {
        let mut t = self.tables.write().await;
        if !t.projects.iter().any(|p| p.id == new.project_id) {
            return Err(DatabaseError::InvalidReference("project does not exist".to_string()));
        }
        t.require_user(new.created_by, "createdBy")?;
        let now = Utc::now();
        let checklist = Checklist {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            name: new.name,
            description: new.description,
            version: 1,
            questions: Json(new.questions),
            is_active: new.is_active,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        t.checklists.push(checklist.clone());
        Ok(checklist)
    }

    async fn get_checklist(&self, id: Uuid) -> DbResult<Checklist> {
        let t = self.tables.read().await;
        t.checklists.iter().find(|c| c.id == id).cloned().ok_or(DatabaseError::NotFound("Checklist"))
    }

    async fn list_checklists(
        &self,
        project_id: Uuid,
        active: Option<bool>,
        page: PageRequest,
    ) -> DbResult<Page<Checklist>> {
        let t = self.tables.read().await;
        let checklists = t
            .checklists
            .iter()
            .rev()
            .filter(|c| c.project_id == project_id)
            .filter(|c| active.map_or(true, |a| c.is_active == a))
            .cloned()
            .collect();
        Ok(paginate(checklists, page))
    }

    async fn update_checklist(&self, id: Uuid, changes: ChecklistChanges) -> DbResult<Checklist> {
        let mut t = self.tables.write().await;
        let checklist = t
            .checklists
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DatabaseError::NotFound("Checklist"))?;
        if let Some(v) = changes.name {
            checklist.name = v;
        }
        if let Some(v) = changes.description {
            checklist.description = Some(v);
        }
        if let Some(v) = changes.questions {
            checklist.questions = Json(v);
            checklist.version += 1;
        }
        if let Some(v) = changes.is_active {
            checklist.is_active = v;
        }
        checklist.updated_at = Utc::now();
        Ok(checklist.clone())
    }

    async fn delete_checklist(&self, id: Uuid) -> DbResult<()> {
        let mut t = self.tables.write().await;
        if !t.checklists.iter().any(|c| c.id == id) {
            return Err(DatabaseError::NotFound("Checklist"));
        }
        if t.inspections.iter().any(|i| i.checklist_id == id) {
            return Err(DatabaseError::InvalidReference(
                "checklist is still used by inspections".to_string(),
            ));
        }
        t.checklists.retain(|c| c.id != id);
        Ok(())
    }

    // Inspections

    async fn create_inspection(&self, new: NewInspection) -> DbResult<Inspection> {
        let mut t = self.tables.write().await;
        let version = t
            .checklists
            .iter()
            .find(|c| c.id == new.checklist_id && c.project_id == new.project_id)
            .map(|c| c.version)
            .ok_or_else(|| DatabaseError::InvalidReference("checklist does not belong to this project".to_string()))?;
        t.require_user(new.assigned_to, "assignedTo")?;
        t.require_user(new.created_by, "createdBy")?;

        let now = Utc::now();
        let inspection = Inspection {
            id: Uuid::new_v4(),
            project_id: new.project_id,
            checklist_id: new.checklist_id,
            checklist_version: version,
            assigned_to: new.assigned_to,
            title: new.title,
            status: InspectionStatus::Draft,
            rejection_count: 0,
            responses: serde_json::json!({}),
            latitude: None,
            longitude: None,
            accuracy: None,
            notes: new.notes,
            due_date: new.due_date,
            submitted_at: None,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        t.inspections.push(inspection.clone());
        Ok(inspection)
    }

    async fn get_inspection(&self, id: Uuid) -> DbResult<Inspection> {
        let t = self.tables.read().await;
        t.inspections.iter().find(|i| i.id == id).cloned().ok_or(DatabaseError::NotFound("Inspection"))
    }

    async fn list_inspections(&self, filter: InspectionFilter, page: PageRequest) -> DbResult<Page<Inspection>> {
        let t = self.tables.read().await;
        let inspections = t
            .inspections
            .iter()
            .rev()
            .filter(|i| filter.project_id.map_or(true, |p| i.project_id == p))
            .filter(|i| filter.assigned_to.map_or(true, |a| i.assigned_to == a))
            .filter(|i| filter.status.map_or(true, |s| i.status == s))
            .cloned()
            .collect();
        Ok(paginate(inspections, page))
    }

    async fn update_inspection(&self, id: Uuid, changes: InspectionChanges) -> DbResult<Inspection> {
        let mut t = self.tables.write().await;
        if let Some(assignee) = changes.assigned_to {
            t.require_user(assignee, "assignedTo")?;
        }
        let inspection = t
            .inspections
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(DatabaseError::NotFound("Inspection"))?;
        if let Some(v) = changes.title {
            inspection.title = v;
        }
        if let Some(v) = changes.assigned_to {
            inspection.assigned_to = v;
        }
        if let Some(v) = changes.status {
            inspection.status = v;
        }
        if let Some(v) = changes.rejection_count {
            inspection.rejection_count = v;
        }
        if let Some(v) = changes.responses {
            inspection.responses = v;
        }
        if let Some(v) = changes.latitude {
            inspection.latitude = Some(v);
        }
        if let Some(v) = changes.longitude {
            inspection.longitude = Some(v);
        }
        if let Some(v) = changes.accuracy {
            inspection.accuracy = Some(v);
        }
        if let Some(v) = changes.notes {
            inspection.notes = Some(v);
        }
        if let Some(v) = changes.due_date {
            inspection.due_date = Some(v);
        }
        if let Some(v) = changes.submitted_at {
            inspection.submitted_at = Some(v);
        }
        inspection.updated_at = Utc::now();
        Ok(inspection.clone())
    }

    async fn delete_inspection(&self, id: Uuid) -> DbResult<()> {
        let mut t = self.tables.write().await;
        if !t.inspections.iter().any(|i| i.id == id) {
            return Err(DatabaseError::NotFound("Inspection"));
        }
        t.evidence.retain(|e| e.inspection_id != id);
        t.approvals.retain(|a| a.inspection_id != id);
        t.escalations.retain(|e| e.inspection_id != id);
        t.inspections.retain(|i| i.id != id);
        Ok(())
    }

    async fn count_inspections_by_status(&self) -> DbResult<Vec<StatusCount>> {
        let t = self.tables.read().await;
        Ok(count_by(&t.inspections, |i| i.status.as_str()))
    }

    // Evidence

    async fn create_evidence(&self, new: NewEvidence) -> DbResult<Evidence> {
        let mut t = self.tables.write().await;
        t.require_inspection(new.inspection_id)?;
        t.require_user(new.uploaded_by, "uploadedBy")?;
        if t.evidence.iter().any(|e| e.id == new.id || e.storage_path == new.storage_path) {
            return Err(DatabaseError::Conflict(format!("evidence {} already exists", new.storage_path)));
        }
        let evidence = Evidence {
            id: new.id,
            inspection_id: new.inspection_id,
            uploaded_by: new.uploaded_by,
            file_name: new.file_name,
            mime_type: new.mime_type,
            size_bytes: new.size_bytes,
            checksum: new.checksum,
            storage_path: new.storage_path,
            url: new.url,
            latitude: new.latitude,
            longitude: new.longitude,
            accuracy: new.accuracy,
            captured_at: new.captured_at,
            annotations: new.annotations,
            created_at: Utc::now(),
        };
        t.evidence.push(evidence.clone());
        Ok(evidence)
    }

    async fn get_evidence(&self, id: Uuid) -> DbResult<Evidence> {
        let t = self.tables.read().await;
        t.evidence.iter().find(|e| e.id == id).cloned().ok_or(DatabaseError::NotFound("Evidence"))
    }

    async fn list_evidence(&self, inspection_id: Uuid) -> DbResult<Vec<Evidence>> {
        let t = self.tables.read().await;
        Ok(t.evidence.iter().rev().filter(|e| e.inspection_id == inspection_id).cloned().collect())
    }

    async fn evidence_bytes_for_inspection(&self, inspection_id: Uuid) -> DbResult<i64> {
        let t = self.tables.read().await;
        Ok(t.evidence
            .iter()
            .filter(|e| e.inspection_id == inspection_id)
            .map(|e| e.size_bytes)
            .sum())
    }

    async fn total_evidence_bytes(&self) -> DbResult<i64> {
        let t = self.tables.read().await;
        Ok(t.evidence.iter().map(|e| e.size_bytes).sum())
    }

    async fn delete_evidence(&self, id: Uuid) -> DbResult<()> {
        let mut t = self.tables.write().await;
        let before = t.evidence.len();
        t.evidence.retain(|e| e.id != id);
        if t.evidence.len() == before {
            return Err(DatabaseError::NotFound("Evidence"));
        }
        Ok(())
    }

    // Approvals

    async fn record_decision(&self, record: DecisionRecord) -> DbResult<DecisionOutcome> {
        let mut t = self.tables.write().await;
        t.require_user(record.approval.manager_id, "managerId")?;
        if let Some(escalation) = &record.escalation {
            if let Some(target) = escalation.new_manager_id {
                t.require_user(target, "escalateTo")?;
            }
            let open = t
                .escalations
                .iter()
                .any(|e| e.inspection_id == escalation.inspection_id && e.status.is_open());
            if open {
                return Err(DatabaseError::Conflict("inspection already has an open escalation".to_string()));
            }
        }

        let now = Utc::now();
        let inspection = t
            .inspections
            .iter_mut()
            .find(|i| i.id == record.approval.inspection_id)
            .ok_or(DatabaseError::NotFound("Inspection"))?;
        if inspection.status != record.expected_status || inspection.rejection_count != record.expected_rejection_count {
            return Err(DatabaseError::Conflict("Inspection was changed by another request".to_string()));
        }
        inspection.status = record.next_status;
        inspection.rejection_count = record.next_rejection_count;
        inspection.updated_at = now;
        let inspection = inspection.clone();

        let approval = Approval {
            id: Uuid::new_v4(),
            inspection_id: record.approval.inspection_id,
            manager_id: record.approval.manager_id,
            decision: record.approval.decision,
            notes: record.approval.notes,
            escalated: record.approval.escalated,
            escalation_reason: record.approval.escalation_reason,
            created_at: now,
        };
        t.approvals.push(approval.clone());

        let escalation = record.escalation.map(|new| {
            let escalation = new_escalation_row(new);
            t.escalations.push(escalation.clone());
            escalation
        });

        Ok(DecisionOutcome {
            approval,
            inspection,
            escalation,
        })
    }

    async fn list_approvals(&self, inspection_id: Uuid) -> DbResult<Vec<Approval>> {
        let t = self.tables.read().await;
        Ok(t.approvals.iter().rev().filter(|a| a.inspection_id == inspection_id).cloned().collect())
    }

    // Escalations

    async fn create_escalation(&self, new: NewEscalation) -> DbResult<Escalation> {
        let mut t = self.tables.write().await;
        t.require_inspection(new.inspection_id)?;
        t.require_user(new.original_manager_id, "originalManagerId")?;
        if let Some(target) = new.new_manager_id {
            t.require_user(target, "newManagerId")?;
        }
        if t.escalations.iter().any(|e| e.inspection_id == new.inspection_id && e.status.is_open()) {
            return Err(DatabaseError::Conflict("inspection already has an open escalation".to_string()));
        }
        let escalation = new_escalation_row(new);
        t.escalations.push(escalation.clone());
        Ok(escalation)
    }

    async fn get_escalation(&self, id: Uuid) -> DbResult<Escalation> {
        let t = self.tables.read().await;
        t.escalations.iter().find(|e| e.id == id).cloned().ok_or(DatabaseError::NotFound("Escalation"))
    }

    async fn list_escalations(&self, filter: EscalationFilter, page: PageRequest) -> DbResult<Page<Escalation>> {
        let t = self.tables.read().await;
        let escalations = t
            .escalations
            .iter()
            .rev()
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .filter(|e| filter.inspection_id.map_or(true, |i| e.inspection_id == i))
            .cloned()
            .collect();
        Ok(paginate(escalations, page))
    }

    async fn update_escalation(&self, id: Uuid, changes: EscalationChanges) -> DbResult<Escalation> {
        let mut t = self.tables.write().await;
        let escalation = t
            .escalations
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DatabaseError::NotFound("Escalation"))?;
        escalation.status = changes.status;
        if let Some(v) = changes.resolution_notes {
            escalation.resolution_notes = Some(v);
        }
        if let Some(v) = changes.resolved_at {
            escalation.resolved_at = Some(v);
        }
        escalation.updated_at = Utc::now();
        Ok(escalation.clone())
    }

    async fn open_escalation_for_inspection(&self, inspection_id: Uuid) -> DbResult<Option<Escalation>> {
        let t = self.tables.read().await;
        Ok(t.escalations
            .iter()
            .rev()
            .find(|e| e.inspection_id == inspection_id && e.status.is_open())
            .cloned())
    }

    async fn count_open_escalations(&self) -> DbResult<i64> {
        let t = self.tables.read().await;
        Ok(t.escalations.iter().filter(|e| e.status.is_open()).count() as i64)
    }

    // Notifications

    async fn create_notification(&self, new: NewNotification) -> DbResult<Notification> {
        let mut t = self.tables.write().await;
        t.require_user(new.user_id, "userId")?;
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            entity_type: new.entity_type,
            entity_id: new.entity_id,
            read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        t.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> DbResult<Page<Notification>> {
        let t = self.tables.read().await;
        let notifications = t
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        Ok(paginate(notifications, page))
    }

    async fn unread_notification_ids(&self, user_id: Uuid) -> DbResult<Vec<Uuid>> {
        let t = self.tables.read().await;
        Ok(t.notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .map(|n| n.id)
            .collect())
    }

    async fn count_unread_notifications(&self, user_id: Uuid) -> DbResult<i64> {
        let t = self.tables.read().await;
        Ok(t.notifications.iter().filter(|n| n.user_id == user_id && !n.read).count() as i64)
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> DbResult<Notification> {
        let mut t = self.tables.write().await;
        let notification = t
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or(DatabaseError::NotFound("Notification"))?;
        notification.read = true;
        notification.read_at.get_or_insert_with(Utc::now);
        Ok(notification.clone())
    }

    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> DbResult<()> {
        let mut t = self.tables.write().await;
        let before = t.notifications.len();
        t.notifications.retain(|n| !(n.id == id && n.user_id == user_id));
        if t.notifications.len() == before {
            return Err(DatabaseError::NotFound("Notification"));
        }
        Ok(())
    }

    // Audit

    async fn append_audit(&self, entry: NewAuditEntry) -> DbResult<()> {
        let mut t = self.tables.write().await;
        t.audit.push(AuditLog {
            id: Uuid::new_v4(),
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            action: entry.action,
            user_id: entry.user_id,
            metadata: entry.metadata,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_audit(&self, filter: AuditFilter, page: PageRequest) -> DbResult<Page<AuditLog>> {
        let t = self.tables.read().await;
        let entries = t
            .audit
            .iter()
            .rev()
            .filter(|a| filter.entity_type.as_deref().map_or(true, |ty| a.entity_type == ty))
            .filter(|a| filter.entity_id.map_or(true, |id| a.entity_id == id))
            .cloned()
            .collect();
        Ok(paginate(entries, page))
    }
}

fn new_escalation_row(new: NewEscalation) -> Escalation {
    let now = Utc::now();
    Escalation {
        id: Uuid::new_v4(),
        inspection_id: new.inspection_id,
        original_manager_id: new.original_manager_id,
        new_manager_id: new.new_manager_id,
        reason: new.reason,
        status: EscalationStatus::Queued,
        resolution_notes: None,
        created_at: now,
        updated_at: now,
        resolved_at: None,
    }
}
