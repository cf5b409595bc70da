use crate::database::models::{Decision, InspectionStatus};

use super::WorkflowError;

/// Rejections allowed before a further rejection must be escalated
pub const MAX_REJECTIONS: i32 = 2;

/// Outcome of a manager's decision, ready to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPlan {
    pub status: InspectionStatus,
    pub rejection_count: i32,
    pub escalate: bool,
}

/// Responses, notes and location are editable only while the inspector holds the inspection
pub fn is_editable(status: InspectionStatus) -> bool {
    matches!(status, InspectionStatus::Draft | InspectionStatus::Rejected)
}

pub fn submit(status: InspectionStatus) -> Result<InspectionStatus, WorkflowError> {
    if is_editable(status) {
        Ok(InspectionStatus::Pending)
    } else {
        Err(WorkflowError::InvalidInspectionTransition {
            from: status,
            to: InspectionStatus::Pending,
        })
    }
}

pub fn start_review(status: InspectionStatus) -> Result<InspectionStatus, WorkflowError> {
    match status {
        InspectionStatus::Pending => Ok(InspectionStatus::InReview),
        from => Err(WorkflowError::InvalidInspectionTransition {
            from,
            to: InspectionStatus::InReview,
        }),
    }
}

/// Apply the escalation rule to an approve/reject decision.
///
/// Each rejection increments the counter. Once it has reached
/// [`MAX_REJECTIONS`], another rejection is only accepted with `escalate`
/// set; the counter then stays at the ceiling and an escalation is opened.
pub fn decide(
    status: InspectionStatus,
    rejection_count: i32,
    decision: Decision,
    escalate: bool,
) -> Result<DecisionPlan, WorkflowError> {
    if !matches!(status, InspectionStatus::Pending | InspectionStatus::InReview) {
        return Err(WorkflowError::NotAwaitingDecision(status));
    }

    match decision {
        Decision::Approved => Ok(DecisionPlan {
            status: InspectionStatus::Approved,
            rejection_count,
            escalate: false,
        }),
        Decision::Rejected if rejection_count >= MAX_REJECTIONS => {
            if !escalate {
                return Err(WorkflowError::EscalationRequired(rejection_count));
            }
            Ok(DecisionPlan {
                status: InspectionStatus::Rejected,
                rejection_count: MAX_REJECTIONS,
                escalate: true,
            })
        }
        Decision::Rejected => {
            if escalate {
                return Err(WorkflowError::EscalationNotYetAllowed(rejection_count));
            }
            Ok(DecisionPlan {
                status: InspectionStatus::Rejected,
                rejection_count: rejection_count + 1,
                escalate: false,
            })
        }
    }
}
