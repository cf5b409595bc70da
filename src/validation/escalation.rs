use serde::Deserialize;
use uuid::Uuid;

use super::ValidationErrors;
use crate::database::models::EscalationStatus;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEscalationRequest {
    pub inspection_id: Option<String>,
    pub reason: Option<String>,
    pub new_manager_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EscalationInput {
    pub inspection_id: Uuid,
    pub reason: String,
    pub new_manager_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEscalationStatusRequest {
    pub status: Option<String>,
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EscalationStatusInput {
    pub status: EscalationStatus,
    pub resolution_notes: Option<String>,
}

impl CreateEscalationRequest {
    pub fn validate(self) -> Result<EscalationInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let inspection_id = errors.uuid("inspectionId", self.inspection_id.as_deref(), true);
        let reason = errors.text("reason", self.reason, 1, 2000, true);
        let new_manager_id = errors.uuid("newManagerId", self.new_manager_id.as_deref(), false);

        match (inspection_id, reason) {
            (Some(inspection_id), Some(reason)) => errors.finish(EscalationInput {
                inspection_id,
                reason,
                new_manager_id,
            }),
            _ => Err(errors),
        }
    }
}

impl UpdateEscalationStatusRequest {
    pub fn validate(self) -> Result<EscalationStatusInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let status = match self.status.as_deref() {
            None => {
                errors.add("status", "status is required");
                None
            }
            Some(raw) => {
                let status = EscalationStatus::parse(raw);
                if status.is_none() {
                    errors.add("status", "status must be one of: QUEUED, NOTIFIED, RESOLVED, EXPIRED");
                }
                status
            }
        };
        let resolution_notes = errors.text("resolutionNotes", self.resolution_notes, 0, 5000, false);

        match status {
            Some(status) => errors.finish(EscalationStatusInput { status, resolution_notes }),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_inspection_and_reason() {
        let errors = CreateEscalationRequest::default().validate().unwrap_err();
        assert!(errors.has("inspectionId"));
        assert!(errors.has("reason"));
    }

    #[test]
    fn status_is_case_insensitive() {
        let input = UpdateEscalationStatusRequest {
            status: Some("notified".into()),
            resolution_notes: None,
        }
        .validate()
        .unwrap();
        assert_eq!(input.status, EscalationStatus::Notified);
    }

    #[test]
    fn unknown_status_rejected() {
        let errors = UpdateEscalationStatusRequest {
            status: Some("CLOSED".into()),
            resolution_notes: None,
        }
        .validate()
        .unwrap_err();
        assert!(errors.has("status"));
    }
}
