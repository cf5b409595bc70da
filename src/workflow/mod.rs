//! Inspection and escalation state machines.
//!
//! Pure functions over statuses and counters; handlers load the rows, ask
//! these for the next state, and persist the result.

pub mod escalation;
pub mod inspection;

use thiserror::Error;

use crate::database::models::{EscalationStatus, InspectionStatus};
use crate::error::ApiError;

pub use escalation::{check_escalation_allowed, check_transition};
pub use inspection::{decide, is_editable, start_review, submit, DecisionPlan, MAX_REJECTIONS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Cannot move inspection from {from} to {to}")]
    InvalidInspectionTransition { from: InspectionStatus, to: InspectionStatus },

    #[error("Inspection is {0} and is not awaiting a decision")]
    NotAwaitingDecision(InspectionStatus),

    #[error("Inspection is {0} and can no longer be edited")]
    NotEditable(InspectionStatus),

    #[error("Inspection has been rejected {0} times; a further rejection must be escalated with a reason")]
    EscalationRequired(i32),

    #[error("Escalation is only available after {max} rejections (currently {0})", max = MAX_REJECTIONS)]
    EscalationNotYetAllowed(i32),

    #[error("Cannot move escalation from {from} to {to}")]
    InvalidEscalationTransition { from: EscalationStatus, to: EscalationStatus },
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::EscalationRequired(_) => ApiError::field_error("escalate", err.to_string()),
            WorkflowError::EscalationNotYetAllowed(_) => ApiError::field_error("escalate", err.to_string()),
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn escalation_required_is_a_field_error() {
        let err: ApiError = WorkflowError::EscalationRequired(2).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["field"], "escalate");
    }

    #[test]
    fn transitions_are_plain_bad_requests() {
        let err: ApiError = WorkflowError::NotAwaitingDecision(InspectionStatus::Approved).into();
        assert_eq!(err.error_code(), "BAD_REQUEST");
        assert!(err.message().contains("approved"));
    }
}
