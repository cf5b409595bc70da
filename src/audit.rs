//! Fire-and-forget audit trail.
//!
//! Entries are written on a spawned task after the state change has
//! succeeded. A failed write is logged and otherwise ignored; it never
//! changes the response the caller gets.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::database::models::NewAuditEntry;
use crate::database::Datastore;

pub fn record(
    store: &Arc<dyn Datastore>,
    user_id: Uuid,
    entity_type: &str,
    entity_id: Uuid,
    action: &str,
    metadata: Value,
) {
    let store = Arc::clone(store);
    let entry = NewAuditEntry {
        entity_type: entity_type.to_string(),
        entity_id,
        action: action.to_string(),
        user_id,
        metadata,
    };

    tokio::spawn(async move {
        let (entity_type, action) = (entry.entity_type.clone(), entry.action.clone());
        if let Err(e) = store.append_audit(entry).await {
            tracing::warn!(%entity_type, %entity_id, %action, "Failed to write audit entry: {}", e);
        }
    });
}
