use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_project_access, page_request};
use crate::api::{JsonBody, Page, PathId, QueryParams};
use crate::audit;
use crate::database::models::Checklist;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::{ANY_ROLE, MANAGERS};
use crate::state::AppState;
use crate::validation::checklist::{CreateChecklistRequest, UpdateChecklistRequest};

#[derive(Debug, Default, Deserialize)]
pub struct ChecklistQuery {
    pub active: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/projects/:id/checklists
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(project_id): PathId,
    QueryParams(query): QueryParams<ChecklistQuery>,
) -> ApiResult<Page<Checklist>> {
    user.require(ANY_ROLE)?;
    let project = state.store.get_project(project_id).await?;
    check_project_access(&user, &project)?;

    let active = match query.active.as_deref() {
        None | Some("") => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(_) => return Err(ApiError::field_error("active", "active must be true or false")),
    };
    let page = page_request(&state, query.page, query.limit);
    Ok(ApiResponse::success(state.store.list_checklists(project_id, active, page).await?))
}

/// POST /api/projects/:id/checklists
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(project_id): PathId,
    JsonBody(body): JsonBody<CreateChecklistRequest>,
) -> ApiResult<Checklist> {
    user.require(MANAGERS)?;
    state.store.get_project(project_id).await?;
    let new = body.validate(project_id, user.id)?;
    let checklist = state.store.create_checklist(new).await?;

    audit::record(
        &state.store,
        user.id,
        "checklist",
        checklist.id,
        "create",
        json!({ "projectId": project_id, "questions": checklist.questions.len() }),
    );
    Ok(ApiResponse::created(checklist))
}

/// GET /api/checklists/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Checklist> {
    user.require(ANY_ROLE)?;
    let checklist = state.store.get_checklist(id).await?;
    if !user.is_manager() {
        let project = state.store.get_project(checklist.project_id).await?;
        check_project_access(&user, &project)?;
    }
    Ok(ApiResponse::success(checklist))
}

/// PUT /api/checklists/:id - replacing questions bumps the version
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody<UpdateChecklistRequest>,
) -> ApiResult<Checklist> {
    user.require(MANAGERS)?;
    let changes = body.validate()?;
    let checklist = state.store.update_checklist(id, changes).await?;

    audit::record(
        &state.store,
        user.id,
        "checklist",
        id,
        "update",
        json!({ "version": checklist.version }),
    );
    Ok(ApiResponse::success(checklist))
}

/// DELETE /api/checklists/:id
pub async fn delete(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Value> {
    user.require(MANAGERS)?;
    state.store.delete_checklist(id).await?;

    audit::record(&state.store, user.id, "checklist", id, "delete", json!({}));
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
