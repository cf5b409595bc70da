use axum::extract::State;
use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};

use super::page_request;
use crate::api::{Page, PathId, QueryParams};
use crate::database::models::Notification;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::ANY_ROLE;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub unread: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/notifications - the caller's own, newest first
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<NotificationQuery>,
) -> ApiResult<Page<Notification>> {
    user.require(ANY_ROLE)?;
    let page = page_request(&state, query.page, query.limit);
    let notifications = state
        .store
        .list_notifications(user.id, query.unread.unwrap_or(false), page)
        .await?;
    Ok(ApiResponse::success(notifications))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Value> {
    user.require(ANY_ROLE)?;
    let count = state.store.count_unread_notifications(user.id).await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// PATCH /api/notifications/:id/read
pub async fn mark_read(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Notification> {
    user.require(ANY_ROLE)?;
    Ok(ApiResponse::success(state.store.mark_notification_read(id, user.id).await?))
}

/// POST /api/notifications/read-all
///
/// Marks each unread notification independently; individual failures are
/// counted rather than failing the whole batch.
pub async fn read_all(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Value> {
    user.require(ANY_ROLE)?;
    let ids = state.store.unread_notification_ids(user.id).await?;

    let results = join_all(ids.iter().map(|id| state.store.mark_notification_read(*id, user.id))).await;
    let failed = results.iter().filter(|r| r.is_err()).count();
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        tracing::warn!(user_id = %user.id, "Failed to mark notification read: {}", err);
    }

    Ok(ApiResponse::success(json!({
        "markedAsRead": results.len() - failed,
        "failed": failed,
        "processedAt": Utc::now(),
    })))
}

/// DELETE /api/notifications/:id
pub async fn delete(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Value> {
    user.require(ANY_ROLE)?;
    state.store.delete_notification(id, user.id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
