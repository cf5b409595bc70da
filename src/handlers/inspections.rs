use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_assignee, load_inspection, page_request, parse_uuid_filter};
use crate::api::{JsonBody, Page, PathId, QueryParams};
use crate::audit;
use crate::database::models::{Inspection, InspectionChanges, InspectionFilter, InspectionStatus};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::notify;
use crate::rbac::{ANY_ROLE, MANAGERS};
use crate::state::AppState;
use crate::validation::inspection::{validate_submission, CreateInspectionRequest, UpdateInspectionRequest};
use crate::workflow::{self, WorkflowError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionQuery {
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/inspections - inspectors only ever see their own assignments
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<InspectionQuery>,
) -> ApiResult<Page<Inspection>> {
    user.require(ANY_ROLE)?;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(InspectionStatus::parse(raw).ok_or_else(|| {
            ApiError::field_error(
                "status",
                "status must be one of: draft, pending, in-review, approved, rejected",
            )
        })?),
    };
    let assigned_to = if user.is_manager() {
        parse_uuid_filter("assignedTo", query.assigned_to.as_deref())?
    } else {
        Some(user.id)
    };
    let filter = InspectionFilter {
        project_id: parse_uuid_filter("projectId", query.project_id.as_deref())?,
        assigned_to,
        status,
    };
    let page = page_request(&state, query.page, query.limit);
    Ok(ApiResponse::success(state.store.list_inspections(filter, page).await?))
}

/// POST /api/inspections
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateInspectionRequest>,
) -> ApiResult<Inspection> {
    user.require(MANAGERS)?;
    let new = body.validate(user.id)?;

    match state.store.get_checklist(new.checklist_id).await {
        Ok(checklist) if !checklist.is_active => {
            return Err(ApiError::field_error("checklistId", "checklist is not active"));
        }
        Ok(_) => {}
        Err(DatabaseError::NotFound(_)) => {
            return Err(ApiError::field_error("checklistId", "checklist does not exist"));
        }
        Err(e) => return Err(e.into()),
    }
    let project = match state.store.get_project(new.project_id).await {
        Ok(project) => project,
        Err(DatabaseError::NotFound(_)) => {
            return Err(ApiError::field_error("projectId", "project does not exist"));
        }
        Err(e) => return Err(e.into()),
    };
    check_assignee(&state, &project, new.assigned_to).await?;

    let inspection = state.store.create_inspection(new).await?;
    notify::send(state.store.as_ref(), notify::inspection_assigned(&inspection)).await;

    audit::record(
        &state.store,
        user.id,
        "inspection",
        inspection.id,
        "create",
        json!({ "projectId": inspection.project_id, "assignedTo": inspection.assigned_to }),
    );
    Ok(ApiResponse::created(inspection))
}

/// GET /api/inspections/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Inspection> {
    user.require(ANY_ROLE)?;
    Ok(ApiResponse::success(load_inspection(&state, &user, id).await?))
}

/// PATCH /api/inspections/:id - field edits while the inspection is a draft or rejected
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody<UpdateInspectionRequest>,
) -> ApiResult<Inspection> {
    user.require(ANY_ROLE)?;
    let inspection = load_inspection(&state, &user, id).await?;
    if !workflow::is_editable(inspection.status) {
        return Err(WorkflowError::NotEditable(inspection.status).into());
    }
    if body.assigned_to.is_some() && !user.is_manager() {
        return Err(ApiError::forbidden("Only a manager can reassign an inspection"));
    }

    let checklist = state.store.get_checklist(inspection.checklist_id).await?;
    let changes = body.validate(&checklist.questions)?;
    let reassigned = changes.assigned_to.filter(|to| *to != inspection.assigned_to);
    if let Some(assignee) = reassigned {
        let project = state.store.get_project(inspection.project_id).await?;
        check_assignee(&state, &project, assignee).await?;
    }
    let updated = state.store.update_inspection(id, changes).await?;

    if reassigned.is_some() {
        notify::send(state.store.as_ref(), notify::inspection_assigned(&updated)).await;
    }
    audit::record(
        &state.store,
        user.id,
        "inspection",
        id,
        "update",
        json!({ "reassignedTo": reassigned }),
    );
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/inspections/:id - evidence, approvals and escalations go with it
pub async fn delete(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Value> {
    user.require(MANAGERS)?;
    let evidence = state.store.list_evidence(id).await?;
    state.store.delete_inspection(id).await?;

    for item in &evidence {
        if let Err(e) = state.storage.delete(&item.storage_path).await {
            tracing::warn!(path = %item.storage_path, "Failed to remove evidence file: {}", e);
        }
    }

    audit::record(
        &state.store,
        user.id,
        "inspection",
        id,
        "delete",
        json!({ "evidenceRemoved": evidence.len() }),
    );
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// POST /api/inspections/:id/submit - draft/rejected -> pending
pub async fn submit(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Inspection> {
    user.require(ANY_ROLE)?;
    let inspection = load_inspection(&state, &user, id).await?;
    let next = workflow::submit(inspection.status)?;

    let checklist = state.store.get_checklist(inspection.checklist_id).await?;
    validate_submission(&checklist.questions, &inspection.responses)?;

    let updated = state
        .store
        .update_inspection(
            id,
            InspectionChanges {
                status: Some(next),
                submitted_at: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?;

    audit::record(
        &state.store,
        user.id,
        "inspection",
        id,
        "submit",
        json!({ "from": inspection.status, "to": updated.status }),
    );
    Ok(ApiResponse::success(updated))
}

/// POST /api/inspections/:id/review - pending -> in-review
pub async fn review(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Inspection> {
    user.require(MANAGERS)?;
    let inspection = state.store.get_inspection(id).await?;
    let next = workflow::start_review(inspection.status)?;

    let updated = state
        .store
        .update_inspection(
            id,
            InspectionChanges {
                status: Some(next),
                ..Default::default()
            },
        )
        .await?;

    audit::record(&state.store, user.id, "inspection", id, "review", json!({}));
    Ok(ApiResponse::success(updated))
}
