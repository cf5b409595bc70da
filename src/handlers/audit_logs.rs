use axum::extract::State;
use serde::Deserialize;

use super::{page_request, parse_uuid_filter};
use crate::api::{Page, QueryParams};
use crate::database::models::{AuditFilter, AuditLog};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::EXECUTIVES;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/audit-logs
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<AuditQuery>,
) -> ApiResult<Page<AuditLog>> {
    user.require(EXECUTIVES)?;
    let filter = AuditFilter {
        entity_type: query.entity_type.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        entity_id: parse_uuid_filter("entityId", query.entity_id.as_deref())?,
    };
    let page = page_request(&state, query.page, query.limit);
    Ok(ApiResponse::success(state.store.list_audit(filter, page).await?))
}
