use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_project_access, check_team_members, page_request};
use crate::api::{JsonBody, Page, PathId, QueryParams};
use crate::audit;
use crate::database::models::{Project, ProjectFilter, ProjectStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::{Role, ANY_ROLE, MANAGERS};
use crate::state::AppState;
use crate::validation::project::{CreateProjectRequest, UpdateProjectRequest};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<ProjectQuery>,
) -> ApiResult<Page<Project>> {
    user.require(ANY_ROLE)?;
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(ProjectStatus::parse(raw).ok_or_else(|| {
            ApiError::field_error("status", "status must be one of: active, on-hold, completed, archived")
        })?),
    };
    let filter = ProjectFilter {
        status,
        member: (!user.is_manager()).then_some(user.id),
    };
    let page = page_request(&state, query.page, query.limit);
    Ok(ApiResponse::success(state.store.list_projects(filter, page).await?))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateProjectRequest>,
) -> ApiResult<Project> {
    user.require(MANAGERS)?;
    let new = body.validate(user.id)?;
    check_team_members(&state, &new.team_members).await?;
    let project = state.store.create_project(new).await?;

    audit::record(
        &state.store,
        user.id,
        "project",
        project.id,
        "create",
        json!({ "name": project.name, "status": project.status }),
    );
    Ok(ApiResponse::created(project))
}

/// GET /api/projects/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Project> {
    user.require(ANY_ROLE)?;
    let project = state.store.get_project(id).await?;
    check_project_access(&user, &project)?;
    Ok(ApiResponse::success(project))
}

/// PUT /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody<UpdateProjectRequest>,
) -> ApiResult<Project> {
    user.require(MANAGERS)?;
    let existing = state.store.get_project(id).await?;
    let changes = body.validate(&existing)?;
    if let Some(members) = &changes.team_members {
        check_team_members(&state, members).await?;
    }
    let project = state.store.update_project(id, changes).await?;

    audit::record(
        &state.store,
        user.id,
        "project",
        id,
        "update",
        json!({ "status": project.status }),
    );
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id - executives, or the managing owner
pub async fn delete(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Value> {
    user.require(MANAGERS)?;
    let project = state.store.get_project(id).await?;
    if user.role != Role::Executive && project.owner_id != user.id {
        return Err(ApiError::forbidden("Only an executive or the project owner can delete a project"));
    }
    state.store.delete_project(id).await?;

    audit::record(&state.store, user.id, "project", id, "delete", json!({ "name": project.name }));
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
