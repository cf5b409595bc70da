use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::{approvals::executives, page_request, parse_uuid_filter};
use crate::api::{JsonBody, Page, PathId, QueryParams};
use crate::audit;
use crate::database::models::{Escalation, EscalationChanges, EscalationFilter, EscalationStatus, NewEscalation};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::notify;
use crate::rbac::{Role, MANAGERS};
use crate::state::AppState;
use crate::validation::escalation::{CreateEscalationRequest, UpdateEscalationStatusRequest};
use crate::workflow;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationQuery {
    pub status: Option<String>,
    pub inspection_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/escalations
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<EscalationQuery>,
) -> ApiResult<Page<Escalation>> {
    user.require(MANAGERS)?;
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(EscalationStatus::parse(raw).ok_or_else(|| {
            ApiError::field_error("status", "status must be one of: QUEUED, NOTIFIED, RESOLVED, EXPIRED")
        })?),
    };
    let filter = EscalationFilter {
        status,
        inspection_id: parse_uuid_filter("inspectionId", query.inspection_id.as_deref())?,
    };
    let page = page_request(&state, query.page, query.limit);
    Ok(ApiResponse::success(state.store.list_escalations(filter, page).await?))
}

/// POST /api/escalations - escalate an inspection that has hit the rejection ceiling
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateEscalationRequest>,
) -> ApiResult<Escalation> {
    user.require(MANAGERS)?;
    let input = body.validate()?;

    let inspection = match state.store.get_inspection(input.inspection_id).await {
        Ok(inspection) => inspection,
        Err(DatabaseError::NotFound(_)) => {
            return Err(ApiError::field_error("inspectionId", "inspection does not exist"));
        }
        Err(e) => return Err(e.into()),
    };
    workflow::check_escalation_allowed(inspection.rejection_count)?;
    if state.store.open_escalation_for_inspection(inspection.id).await?.is_some() {
        return Err(ApiError::conflict("Inspection already has an open escalation"));
    }
    if let Some(target) = input.new_manager_id {
        match state.store.get_user(target).await {
            Ok(u) if u.is_active && u.role.is_manager() => {}
            Ok(_) => return Err(ApiError::field_error("newManagerId", "escalation target must be an active manager")),
            Err(DatabaseError::NotFound(_)) => {
                return Err(ApiError::field_error("newManagerId", "escalation target does not exist"));
            }
            Err(e) => return Err(e.into()),
        }
    }

    let escalation = state
        .store
        .create_escalation(NewEscalation {
            inspection_id: inspection.id,
            original_manager_id: user.id,
            new_manager_id: input.new_manager_id,
            reason: input.reason,
        })
        .await?;

    let recipients = match escalation.new_manager_id {
        Some(target) => vec![target],
        None => executives(&state).await,
    };
    for recipient in recipients {
        notify::send(
            state.store.as_ref(),
            notify::escalation_created(&escalation, recipient, &inspection.title),
        )
        .await;
    }

    audit::record(
        &state.store,
        user.id,
        "escalation",
        escalation.id,
        "create",
        json!({ "inspectionId": inspection.id, "reason": escalation.reason }),
    );
    Ok(ApiResponse::created(escalation))
}

/// GET /api/escalations/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Escalation> {
    user.require(MANAGERS)?;
    Ok(ApiResponse::success(state.store.get_escalation(id).await?))
}

/// PATCH /api/escalations/:id/status - executives, or the manager it was escalated to
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody<UpdateEscalationStatusRequest>,
) -> ApiResult<Escalation> {
    user.require(MANAGERS)?;
    let input = body.validate()?;
    let current = state.store.get_escalation(id).await?;

    if user.role != Role::Executive && current.new_manager_id != Some(user.id) {
        return Err(ApiError::forbidden(
            "Only an executive or the manager this escalation is addressed to can update it",
        ));
    }
    workflow::check_transition(current.status, input.status)?;

    let changes = EscalationChanges {
        status: input.status,
        resolution_notes: input.resolution_notes,
        resolved_at: (input.status == EscalationStatus::Resolved).then(Utc::now),
    };
    let escalation = state.store.update_escalation(id, changes).await?;

    if escalation.original_manager_id != user.id {
        notify::send(
            state.store.as_ref(),
            notify::escalation_updated(&escalation, escalation.original_manager_id),
        )
        .await;
    }

    audit::record(
        &state.store,
        user.id,
        "escalation",
        id,
        "status-change",
        json!({ "from": current.status, "to": escalation.status }),
    );
    Ok(ApiResponse::success(escalation))
}
