//! In-app notifications raised by workflow events.
//!
//! Delivery is best-effort: the caller awaits the insert so ordering is
//! predictable, but a failure only logs.

use uuid::Uuid;

use crate::database::models::{Escalation, Inspection, NewNotification, NotificationKind};
use crate::database::Datastore;

pub async fn send(store: &dyn Datastore, notification: NewNotification) {
    let user_id = notification.user_id;
    if let Err(e) = store.create_notification(notification).await {
        tracing::warn!(%user_id, "Failed to create notification: {}", e);
    }
}

pub fn inspection_assigned(inspection: &Inspection) -> NewNotification {
    NewNotification {
        user_id: inspection.assigned_to,
        kind: NotificationKind::InspectionAssigned,
        title: "New inspection assigned".to_string(),
        message: format!("You have been assigned \"{}\"", inspection.title),
        entity_type: Some("inspection".to_string()),
        entity_id: Some(inspection.id),
    }
}

pub fn inspection_decided(inspection: &Inspection, approved: bool, notes: Option<&str>) -> NewNotification {
    let (kind, title, verb) = if approved {
        (NotificationKind::InspectionApproved, "Inspection approved", "approved")
    } else {
        (NotificationKind::InspectionRejected, "Inspection rejected", "rejected")
    };
    let message = match notes {
        Some(notes) => format!("\"{}\" was {}: {}", inspection.title, verb, notes),
        None => format!("\"{}\" was {}", inspection.title, verb),
    };
    NewNotification {
        user_id: inspection.assigned_to,
        kind,
        title: title.to_string(),
        message,
        entity_type: Some("inspection".to_string()),
        entity_id: Some(inspection.id),
    }
}

pub fn escalation_created(escalation: &Escalation, recipient: Uuid, inspection_title: &str) -> NewNotification {
    NewNotification {
        user_id: recipient,
        kind: NotificationKind::EscalationCreated,
        title: "Inspection escalated".to_string(),
        message: format!("\"{}\" was escalated: {}", inspection_title, escalation.reason),
        entity_type: Some("escalation".to_string()),
        entity_id: Some(escalation.id),
    }
}

pub fn escalation_updated(escalation: &Escalation, recipient: Uuid) -> NewNotification {
    NewNotification {
        user_id: recipient,
        kind: NotificationKind::EscalationUpdated,
        title: "Escalation updated".to_string(),
        message: format!("Escalation is now {}", escalation.status),
        entity_type: Some("escalation".to_string()),
        entity_id: Some(escalation.id),
    }
}
