use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Field Inspection API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Projects, checklists, inspections, evidence and approvals for field teams",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/me",
                "users": "/api/users[/:id[/role]]",
                "projects": "/api/projects[/:id[/checklists]]",
                "checklists": "/api/checklists/:id",
                "inspections": "/api/inspections[/:id[/submit|/review|/evidence|/approvals]]",
                "evidence": "/api/evidence/:id",
                "escalations": "/api/escalations[/:id[/status]]",
                "notifications": "/api/notifications[/unread-count|/read-all|/:id[/read]]",
                "analytics": "/api/analytics/overview",
                "audit": "/api/audit-logs"
            }
        }
    }))
}

/// GET /health - datastore reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "status": "ok", "database": "ok" } })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
