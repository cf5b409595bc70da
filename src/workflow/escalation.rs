use crate::database::models::EscalationStatus;

use super::{WorkflowError, MAX_REJECTIONS};

/// QUEUED -> NOTIFIED -> RESOLVED, with EXPIRED reachable from either open state
pub fn check_transition(from: EscalationStatus, to: EscalationStatus) -> Result<(), WorkflowError> {
    use EscalationStatus::*;

    let allowed = matches!(
        (from, to),
        (Queued, Notified) | (Notified, Resolved) | (Queued, Expired) | (Notified, Expired)
    );
    if allowed {
        Ok(())
    } else {
        Err(WorkflowError::InvalidEscalationTransition { from, to })
    }
}

/// An inspection can be escalated once it has hit the rejection ceiling
pub fn check_escalation_allowed(rejection_count: i32) -> Result<(), WorkflowError> {
    if rejection_count >= MAX_REJECTIONS {
        Ok(())
    } else {
        Err(WorkflowError::EscalationNotYetAllowed(rejection_count))
    }
}
