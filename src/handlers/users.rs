use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use super::page_request;
use crate::api::{JsonBody, Page, PathId, QueryParams};
use crate::audit;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::{Role, EXECUTIVES, MANAGERS};
use crate::state::AppState;
use crate::validation::user::UpdateRoleRequest;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<UserQuery>,
) -> ApiResult<Page<User>> {
    user.require(MANAGERS)?;
    let role = match query.role.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<Role>()
                .map_err(|_| ApiError::field_error("role", "role must be one of: EXECUTIVE, PROJECT_MANAGER, INSPECTOR"))?,
        ),
    };
    let page = page_request(&state, query.page, query.limit);
    Ok(ApiResponse::success(state.store.list_users(role, page).await?))
}

/// GET /api/users/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<User> {
    user.require(MANAGERS)?;
    Ok(ApiResponse::success(state.store.get_user(id).await?))
}

/// PATCH /api/users/:id/role
pub async fn update_role(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody<UpdateRoleRequest>,
) -> ApiResult<User> {
    user.require(EXECUTIVES)?;
    let role = body.validate()?;

    let before = state.store.get_user(id).await?;
    let updated = state.store.update_user_role(id, role).await?;

    audit::record(
        &state.store,
        user.id,
        "user",
        id,
        "role-change",
        json!({ "from": before.role, "to": updated.role }),
    );
    Ok(ApiResponse::success(updated))
}
