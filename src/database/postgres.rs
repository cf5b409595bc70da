use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::pagination::{Page, PageRequest};
use crate::database::manager::DatabaseError;
use crate::database::models::*;
use crate::database::store::{Datastore, DbResult};
use crate::rbac::Role;

/// Postgres-backed datastore over the schema in `migrations/`
#[derive(Clone)]
pub struct PgDatastore {
    pool: PgPool,
}

impl PgDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_err(entity: &'static str) -> impl FnOnce(sqlx::Error) -> DatabaseError {
    move |err| DatabaseError::from_sqlx(err, entity)
}

fn expect_one(rows_affected: u64, entity: &'static str) -> DbResult<()> {
    if rows_affected == 0 {
        Err(DatabaseError::NotFound(entity))
    } else {
        Ok(())
    }
}

#[async_trait]
impl Datastore for PgDatastore {
    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // Users

    async fn create_user(&self, new: NewUser) -> DbResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, full_name, role)
             VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4)
             RETURNING *",
        )
        .bind(new.id)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("User"))
    }

    async fn get_user(&self, id: Uuid) -> DbResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("User"))
    }

    async fn list_users(&self, role: Option<Role>, page: PageRequest) -> DbResult<Page<User>> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR role = $1)")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE ($1::text IS NULL OR role = $1)
             ORDER BY full_name, id
             LIMIT $2 OFFSET $3",
        )
        .bind(role)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(users, page, total))
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> DbResult<User> {
        sqlx::query_as::<_, User>("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("User"))
    }

    async fn existing_user_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(found)
    }

    async fn active_user_ids(&self, role: Role) -> DbResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE role = $1 AND is_active ORDER BY id")
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // Projects

    async fn create_project(&self, new: NewProject) -> DbResult<Project> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects
                (name, description, status, start_date, end_date, latitude, longitude, address, team_members, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.status)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(&new.address)
        .bind(&new.team_members)
        .bind(new.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Project"))
    }

    async fn get_project(&self, id: Uuid) -> DbResult<Project> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("Project"))
    }

    async fn list_projects(&self, filter: ProjectFilter, page: PageRequest) -> DbResult<Page<Project>> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR owner_id = $2 OR $2 = ANY(team_members))";

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM projects {}", WHERE))
            .bind(filter.status)
            .bind(filter.member)
            .fetch_one(&self.pool)
            .await?;

        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT * FROM projects {} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
            WHERE
        ))
        .bind(filter.status)
        .bind(filter.member)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(projects, page, total))
    }

    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> DbResult<Project> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                address = COALESCE($9, address),
                team_members = COALESCE($10, team_members),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .bind(changes.address)
        .bind(changes.team_members)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Project"))
    }

    async fn delete_project(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err("Project"))?;
        expect_one(result.rows_affected(), "Project")
    }

    async fn count_projects_by_status(&self) -> DbResult<Vec<StatusCount>> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM projects GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    // Checklists

    async fn create_checklist(&self, new: NewChecklist) -> DbResult<Checklist> {
        sqlx::query_as::<_, Checklist>(
            "INSERT INTO checklists (project_id, name, description, questions, is_active, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(new.project_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(Json(&new.questions))
        .bind(new.is_active)
        .bind(new.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Checklist"))
    }

    async fn get_checklist(&self, id: Uuid) -> DbResult<Checklist> {
        sqlx::query_as::<_, Checklist>("SELECT * FROM checklists WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("Checklist"))
    }

    async fn list_checklists(
        &self,
        project_id: Uuid,
        active: Option<bool>,
        page: PageRequest,
    ) -> DbResult<Page<Checklist>> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM checklists WHERE project_id = $1 AND ($2::boolean IS NULL OR is_active = $2)",
        )
        .bind(project_id)
        .bind(active)
        .fetch_one(&self.pool)
        .await?;

        let checklists = sqlx::query_as::<_, Checklist>(
            "SELECT * FROM checklists
             WHERE project_id = $1 AND ($2::boolean IS NULL OR is_active = $2)
             ORDER BY created_at DESC, id
             LIMIT $3 OFFSET $4",
        )
        .bind(project_id)
        .bind(active)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(checklists, page, total))
    }

    async fn update_checklist(&self, id: Uuid, changes: ChecklistChanges) -> DbResult<Checklist> {
        sqlx::query_as::<_, Checklist>(
            "UPDATE checklists SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                questions = COALESCE($4, questions),
                version = version + CASE WHEN $4::jsonb IS NULL THEN 0 ELSE 1 END,
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.questions.map(Json))
        .bind(changes.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Checklist"))
    }

    async fn delete_checklist(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM checklists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err("Checklist"))?;
        expect_one(result.rows_affected(), "Checklist")
    }

    // Inspections

    async fn create_inspection(&self, new: NewInspection) -> DbResult<Inspection> {
        // The checklist must belong to the project; its current version is pinned.
        let inspection = sqlx::query_as::<_, Inspection>(
            "INSERT INTO inspections
                (project_id, checklist_id, checklist_version, assigned_to, title, notes, due_date, created_by)
             SELECT $1, c.id, c.version, $3, $4, $5, $6, $7
             FROM checklists c
             WHERE c.id = $2 AND c.project_id = $1
             RETURNING *",
        )
        .bind(new.project_id)
        .bind(new.checklist_id)
        .bind(new.assigned_to)
        .bind(&new.title)
        .bind(&new.notes)
        .bind(new.due_date)
        .bind(new.created_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err("Inspection"))?;

        inspection.ok_or_else(|| DatabaseError::InvalidReference("checklist does not belong to this project".to_string()))
    }

    async fn get_inspection(&self, id: Uuid) -> DbResult<Inspection> {
        sqlx::query_as::<_, Inspection>("SELECT * FROM inspections WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("Inspection"))
    }

    async fn list_inspections(&self, filter: InspectionFilter, page: PageRequest) -> DbResult<Page<Inspection>> {
        const WHERE: &str = "WHERE ($1::uuid IS NULL OR project_id = $1)
               AND ($2::uuid IS NULL OR assigned_to = $2)
               AND ($3::text IS NULL OR status = $3)";

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM inspections {}", WHERE))
            .bind(filter.project_id)
            .bind(filter.assigned_to)
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await?;

        let inspections = sqlx::query_as::<_, Inspection>(&format!(
            "SELECT * FROM inspections {} ORDER BY created_at DESC, id LIMIT $4 OFFSET $5",
            WHERE
        ))
        .bind(filter.project_id)
        .bind(filter.assigned_to)
        .bind(filter.status)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(inspections, page, total))
    }

    async fn update_inspection(&self, id: Uuid, changes: InspectionChanges) -> DbResult<Inspection> {
        sqlx::query_as::<_, Inspection>(
            "UPDATE inspections SET
                title = COALESCE($2, title),
                assigned_to = COALESCE($3, assigned_to),
                status = COALESCE($4, status),
                rejection_count = COALESCE($5, rejection_count),
                responses = COALESCE($6, responses),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                accuracy = COALESCE($9, accuracy),
                notes = COALESCE($10, notes),
                due_date = COALESCE($11, due_date),
                submitted_at = COALESCE($12, submitted_at),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.assigned_to)
        .bind(changes.status)
        .bind(changes.rejection_count)
        .bind(changes.responses)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .bind(changes.accuracy)
        .bind(changes.notes)
        .bind(changes.due_date)
        .bind(changes.submitted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Inspection"))
    }

    async fn delete_inspection(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM inspections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err("Inspection"))?;
        expect_one(result.rows_affected(), "Inspection")
    }

    async fn count_inspections_by_status(&self) -> DbResult<Vec<StatusCount>> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM inspections GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    // Evidence

    async fn create_evidence(&self, new: NewEvidence) -> DbResult<Evidence> {
        sqlx::query_as::<_, Evidence>(
            "INSERT INTO evidence
                (id, inspection_id, uploaded_by, file_name, mime_type, size_bytes, checksum, storage_path, url,
                 latitude, longitude, accuracy, captured_at, annotations)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING *",
        )
        .bind(new.id)
        .bind(new.inspection_id)
        .bind(new.uploaded_by)
        .bind(&new.file_name)
        .bind(&new.mime_type)
        .bind(new.size_bytes)
        .bind(&new.checksum)
        .bind(&new.storage_path)
        .bind(&new.url)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.accuracy)
        .bind(new.captured_at)
        .bind(&new.annotations)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Evidence"))
    }

    async fn get_evidence(&self, id: Uuid) -> DbResult<Evidence> {
        sqlx::query_as::<_, Evidence>("SELECT * FROM evidence WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("Evidence"))
    }

    async fn list_evidence(&self, inspection_id: Uuid) -> DbResult<Vec<Evidence>> {
        let evidence = sqlx::query_as::<_, Evidence>(
            "SELECT * FROM evidence WHERE inspection_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(evidence)
    }

    async fn evidence_bytes_for_inspection(&self, inspection_id: Uuid) -> DbResult<i64> {
        let (bytes,): (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(size_bytes), 0)::bigint FROM evidence WHERE inspection_id = $1")
                .bind(inspection_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(bytes)
    }

    async fn total_evidence_bytes(&self) -> DbResult<i64> {
        let (bytes,): (i64,) = sqlx::query_as("SELECT COALESCE(SUM(size_bytes), 0)::bigint FROM evidence")
            .fetch_one(&self.pool)
            .await?;
        Ok(bytes)
    }

    async fn delete_evidence(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM evidence WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), "Evidence")
    }

    // Approvals

    async fn record_decision(&self, record: DecisionRecord) -> DbResult<DecisionOutcome> {
        let mut tx = self.pool.begin().await?;

        let inspection = sqlx::query_as::<_, Inspection>(
            "UPDATE inspections SET status = $2, rejection_count = $3, updated_at = NOW()
             WHERE id = $1 AND status = $4 AND rejection_count = $5
             RETURNING *",
        )
        .bind(record.approval.inspection_id)
        .bind(record.next_status)
        .bind(record.next_rejection_count)
        .bind(record.expected_status)
        .bind(record.expected_rejection_count)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_err("Inspection"))?
        .ok_or_else(|| DatabaseError::Conflict("Inspection was changed by another request".to_string()))?;

        let approval = sqlx::query_as::<_, Approval>(
            "INSERT INTO approvals (inspection_id, manager_id, decision, notes, escalated, escalation_reason)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(record.approval.inspection_id)
        .bind(record.approval.manager_id)
        .bind(record.approval.decision)
        .bind(&record.approval.notes)
        .bind(record.approval.escalated)
        .bind(&record.approval.escalation_reason)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_err("Approval"))?;

        let escalation = match record.escalation {
            Some(new) => Some(insert_escalation(&mut *tx, new).await?),
            None => None,
        };

        tx.commit().await?;
        Ok(DecisionOutcome {
            approval,
            inspection,
            escalation,
        })
    }

    async fn list_approvals(&self, inspection_id: Uuid) -> DbResult<Vec<Approval>> {
        let approvals = sqlx::query_as::<_, Approval>(
            "SELECT * FROM approvals WHERE inspection_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(approvals)
    }

    // Escalations

    async fn create_escalation(&self, new: NewEscalation) -> DbResult<Escalation> {
        let mut conn = self.pool.acquire().await?;
        insert_escalation(&mut *conn, new).await
    }

    async fn get_escalation(&self, id: Uuid) -> DbResult<Escalation> {
        sqlx::query_as::<_, Escalation>("SELECT * FROM escalations WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err("Escalation"))
    }

    async fn list_escalations(&self, filter: EscalationFilter, page: PageRequest) -> DbResult<Page<Escalation>> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR inspection_id = $2)";

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM escalations {}", WHERE))
            .bind(filter.status)
            .bind(filter.inspection_id)
            .fetch_one(&self.pool)
            .await?;

        let escalations = sqlx::query_as::<_, Escalation>(&format!(
            "SELECT * FROM escalations {} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
            WHERE
        ))
        .bind(filter.status)
        .bind(filter.inspection_id)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(escalations, page, total))
    }

    async fn update_escalation(&self, id: Uuid, changes: EscalationChanges) -> DbResult<Escalation> {
        sqlx::query_as::<_, Escalation>(
            "UPDATE escalations SET
                status = $2,
                resolution_notes = COALESCE($3, resolution_notes),
                resolved_at = COALESCE($4, resolved_at),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.status)
        .bind(changes.resolution_notes)
        .bind(changes.resolved_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Escalation"))
    }

    async fn open_escalation_for_inspection(&self, inspection_id: Uuid) -> DbResult<Option<Escalation>> {
        let escalation = sqlx::query_as::<_, Escalation>(
            "SELECT * FROM escalations
             WHERE inspection_id = $1 AND status IN ('QUEUED', 'NOTIFIED')
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(inspection_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(escalation)
    }

    async fn count_open_escalations(&self) -> DbResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM escalations WHERE status IN ('QUEUED', 'NOTIFIED')")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // Notifications

    async fn create_notification(&self, new: NewNotification) -> DbResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, kind, title, message, entity_type, entity_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.kind)
        .bind(&new.title)
        .bind(&new.message)
        .bind(&new.entity_type)
        .bind(new.entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Notification"))
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> DbResult<Page<Notification>> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR NOT read)")
                .bind(user_id)
                .bind(unread_only)
                .fetch_one(&self.pool)
                .await?;

        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications
             WHERE user_id = $1 AND (NOT $2 OR NOT read)
             ORDER BY created_at DESC, id
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(notifications, page, total))
    }

    async fn unread_notification_ids(&self, user_id: Uuid) -> DbResult<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM notifications WHERE user_id = $1 AND NOT read ORDER BY created_at")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn count_unread_notifications(&self, user_id: Uuid) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> DbResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE, read_at = COALESCE(read_at, NOW())
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err("Notification"))
    }

    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), "Notification")
    }

    // Audit

    async fn append_audit(&self, entry: NewAuditEntry) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO audit_logs (entity_type, entity_id, action, user_id, metadata)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.action)
        .bind(entry.user_id)
        .bind(&entry.metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_audit(&self, filter: AuditFilter, page: PageRequest) -> DbResult<Page<AuditLog>> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR entity_type = $1)
               AND ($2::uuid IS NULL OR entity_id = $2)";

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM audit_logs {}", WHERE))
            .bind(&filter.entity_type)
            .bind(filter.entity_id)
            .fetch_one(&self.pool)
            .await?;

        let entries = sqlx::query_as::<_, AuditLog>(&format!(
            "SELECT * FROM audit_logs {} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
            WHERE
        ))
        .bind(&filter.entity_type)
        .bind(filter.entity_id)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(entries, page, total))
    }
}

async fn insert_escalation(conn: &mut sqlx::PgConnection, new: NewEscalation) -> DbResult<Escalation> {
    sqlx::query_as::<_, Escalation>(
        "INSERT INTO escalations (inspection_id, original_manager_id, new_manager_id, reason)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(new.inspection_id)
    .bind(new.original_manager_id)
    .bind(new.new_manager_id)
    .bind(&new.reason)
    .fetch_one(conn)
    .await
    .map_err(map_err("Escalation"))
}
