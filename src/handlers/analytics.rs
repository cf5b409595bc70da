use std::collections::BTreeMap;

use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::models::StatusCount;
use crate::database::DbResult;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::MANAGERS;
use crate::state::AppState;

/// GET /api/analytics/overview
///
/// The aggregates run concurrently. A failing aggregate is logged and
/// reported as `null` so the rest of the dashboard still renders.
pub async fn overview(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Value> {
    user.require(MANAGERS)?;
    let store = &state.store;

    let (projects, inspections, escalations, evidence) = tokio::join!(
        store.count_projects_by_status(),
        store.count_inspections_by_status(),
        store.count_open_escalations(),
        store.total_evidence_bytes(),
    );

    Ok(ApiResponse::success(json!({
        "projectsByStatus": or_null("projectsByStatus", projects.map(by_status)),
        "inspectionsByStatus": or_null("inspectionsByStatus", inspections.map(by_status)),
        "openEscalations": or_null("openEscalations", escalations),
        "evidenceBytes": or_null("evidenceBytes", evidence),
        "generatedAt": Utc::now(),
    })))
}

fn by_status(counts: Vec<StatusCount>) -> BTreeMap<String, i64> {
    counts.into_iter().map(|c| (c.status, c.count)).collect()
}

fn or_null<T: serde::Serialize>(name: &str, result: DbResult<T>) -> Value {
    match result {
        Ok(value) => json!(value),
        Err(e) => {
            tracing::error!(aggregate = name, "Analytics aggregate failed: {}", e);
            Value::Null
        }
    }
}
