use axum::extract::State;
use serde_json::json;

use super::load_inspection;
use crate::api::{JsonBody, PathId};
use crate::audit;
use crate::database::models::{Approval, Decision, DecisionOutcome, DecisionRecord, NewApproval, NewEscalation};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::notify;
use crate::rbac::{Role, ANY_ROLE, MANAGERS};
use crate::state::AppState;
use crate::validation::approval::CreateApprovalRequest;
use crate::workflow;

/// GET /api/inspections/:id/approvals - decision history, newest first
pub async fn list(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Vec<Approval>> {
    user.require(ANY_ROLE)?;
    load_inspection(&state, &user, id).await?;
    Ok(ApiResponse::success(state.store.list_approvals(id).await?))
}

/// POST /api/inspections/:id/approvals
///
/// Approves or rejects a pending (or in-review) inspection. Once an
/// inspection has been rejected twice, a further rejection must carry
/// `escalate: true` and an `escalationReason`; the escalation is opened in
/// the same transaction as the decision.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody<CreateApprovalRequest>,
) -> ApiResult<DecisionOutcome> {
    user.require(MANAGERS)?;
    let input = body.validate()?;
    let inspection = state.store.get_inspection(id).await?;
    let plan = workflow::decide(inspection.status, inspection.rejection_count, input.decision, input.escalate)?;

    let escalation = if plan.escalate {
        if state.store.open_escalation_for_inspection(id).await?.is_some() {
            return Err(ApiError::conflict("Inspection already has an open escalation"));
        }
        if let Some(target) = input.escalate_to {
            match state.store.get_user(target).await {
                Ok(u) if u.is_active && u.role.is_manager() => {}
                Ok(_) => return Err(ApiError::field_error("escalateTo", "escalation target must be an active manager")),
                Err(DatabaseError::NotFound(_)) => {
                    return Err(ApiError::field_error("escalateTo", "escalation target does not exist"));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(NewEscalation {
            inspection_id: id,
            original_manager_id: user.id,
            new_manager_id: input.escalate_to,
            reason: input.escalation_reason.clone().unwrap_or_default(),
        })
    } else {
        None
    };

    let record = DecisionRecord {
        approval: NewApproval {
            inspection_id: id,
            manager_id: user.id,
            decision: input.decision,
            notes: input.notes.clone(),
            escalated: plan.escalate,
            escalation_reason: input.escalation_reason.clone().filter(|_| plan.escalate),
        },
        expected_status: inspection.status,
        expected_rejection_count: inspection.rejection_count,
        next_status: plan.status,
        next_rejection_count: plan.rejection_count,
        escalation,
    };
    let outcome = state.store.record_decision(record).await?;

    let approved = input.decision == Decision::Approved;
    notify::send(
        state.store.as_ref(),
        notify::inspection_decided(&outcome.inspection, approved, input.notes.as_deref()),
    )
    .await;

    if let Some(escalation) = &outcome.escalation {
        let recipients = match escalation.new_manager_id {
            Some(target) => vec![target],
            None => executives(&state).await,
        };
        for recipient in recipients {
            notify::send(
                state.store.as_ref(),
                notify::escalation_created(escalation, recipient, &outcome.inspection.title),
            )
            .await;
        }
        audit::record(
            &state.store,
            user.id,
            "escalation",
            escalation.id,
            "create",
            json!({ "inspectionId": id, "reason": escalation.reason }),
        );
    }

    audit::record(
        &state.store,
        user.id,
        "inspection",
        id,
        if approved { "approve" } else { "reject" },
        json!({
            "approvalId": outcome.approval.id,
            "from": inspection.status,
            "to": outcome.inspection.status,
            "rejectionCount": outcome.inspection.rejection_count,
            "escalated": plan.escalate,
        }),
    );

    Ok(ApiResponse::created(outcome))
}

/// Every active executive, the default audience for an unaddressed escalation
pub(crate) async fn executives(state: &AppState) -> Vec<uuid::Uuid> {
    match state.store.active_user_ids(Role::Executive).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Failed to look up executives for escalation notice: {}", e);
            Vec::new()
        }
    }
}
