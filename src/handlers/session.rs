use axum::extract::State;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::ANY_ROLE;
use crate::state::AppState;

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<User> {
    user.require(ANY_ROLE)?;
    let user = state.store.get_user(user.id).await?;
    Ok(ApiResponse::success(user))
}
