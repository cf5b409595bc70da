use serde::Deserialize;
use uuid::Uuid;

use super::ValidationErrors;
use crate::database::models::Decision;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApprovalRequest {
    pub decision: Option<String>,
    pub notes: Option<String>,
    pub escalate: Option<bool>,
    pub escalation_reason: Option<String>,
    pub escalate_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalInput {
    pub decision: Decision,
    pub notes: Option<String>,
    pub escalate: bool,
    pub escalation_reason: Option<String>,
    pub escalate_to: Option<Uuid>,
}

impl CreateApprovalRequest {
    pub fn validate(self) -> Result<ApprovalInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let decision = match self.decision.as_deref() {
            None => {
                errors.add("decision", "decision is required");
                None
            }
            Some(raw) => {
                let decision = Decision::parse(raw);
                if decision.is_none() {
                    errors.add("decision", "decision must be one of: approved, rejected");
                }
                decision
            }
        };
        let notes = errors.text("notes", self.notes, 0, 5000, false);
        let escalate = self.escalate.unwrap_or(false);
        let escalation_reason = errors.text("escalationReason", self.escalation_reason, 1, 2000, escalate);
        let escalate_to = errors.uuid("escalateTo", self.escalate_to.as_deref(), false);

        if decision == Some(Decision::Rejected) && notes.is_none() {
            errors.add("notes", "notes are required when rejecting an inspection");
        }
        if escalate && decision == Some(Decision::Approved) {
            errors.add("escalate", "only a rejection can be escalated");
        }
        if !escalate && (escalation_reason.is_some() || escalate_to.is_some()) {
            errors.add("escalate", "escalate must be true when escalation details are provided");
        }

        match decision {
            Some(decision) => errors.finish(ApprovalInput {
                decision,
                notes,
                escalate,
                escalation_reason,
                escalate_to,
            }),
            None => Err(errors),
        }
    }
}
