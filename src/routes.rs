//! Router assembly.
//!
//! Public routes sit at the root; everything under `/api` passes through
//! JWT verification and then the user-validation middleware, so handlers
//! can take a [`CurrentUser`](crate::middleware::CurrentUser) directly.
//! Stored evidence files at `/files` sit behind the same two layers plus an
//! inspection access check.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{SecurityConfig, StorageBackend, MIB};
use crate::handlers::{
    analytics, approvals, audit_logs, checklists, escalations, evidence, inspections, notifications, projects,
    session, system, users,
};
use crate::middleware::{evidence_access_middleware, jwt_auth_middleware, validate_user_middleware};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(user_routes())
        .merge(project_routes())
        .merge(inspection_routes(&state))
        .merge(workflow_routes())
        .merge(notification_routes())
        .route("/api/analytics/overview", get(analytics::overview))
        .route("/api/audit-logs", get(audit_logs::list))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(api);

    // Local evidence files are served back from the configured directory
    if state.config.storage.backend == StorageBackend::Postgres {
        let files = Router::new()
            .nest_service("/files", ServeDir::new(&state.config.storage.evidence_dir))
            .layer(from_fn_with_state(state.clone(), evidence_access_middleware))
            .layer(from_fn_with_state(state.clone(), validate_user_middleware))
            .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));
        router = router.merge(files);
    }

    router
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(session::me))
        .route("/api/users", get(users::list))
        .route("/api/users/:id", get(users::show))
        .route("/api/users/:id/role", patch(users::update_role))
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/:id",
            get(projects::show).put(projects::update).delete(projects::delete),
        )
        .route(
            "/api/projects/:id/checklists",
            get(checklists::list).post(checklists::create),
        )
        .route(
            "/api/checklists/:id",
            get(checklists::show).put(checklists::update).delete(checklists::delete),
        )
}

fn inspection_routes(state: &AppState) -> Router<AppState> {
    // Room for the multipart framing and metadata fields around the file
    let upload_limit = (state.config.evidence.max_file_bytes + MIB) as usize;

    Router::new()
        .route("/api/inspections", get(inspections::list).post(inspections::create))
        .route(
            "/api/inspections/:id",
            get(inspections::show)
                .patch(inspections::update)
                .delete(inspections::delete),
        )
        .route("/api/inspections/:id/submit", post(inspections::submit))
        .route("/api/inspections/:id/review", post(inspections::review))
        .route(
            "/api/inspections/:id/evidence",
            get(evidence::list).post(evidence::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/evidence/:id", get(evidence::show).delete(evidence::delete))
}

fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/inspections/:id/approvals",
            get(approvals::list).post(approvals::create),
        )
        .route("/api/escalations", get(escalations::list).post(escalations::create))
        .route("/api/escalations/:id", get(escalations::show))
        .route("/api/escalations/:id/status", patch(escalations::update_status))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/notifications/read-all", post(notifications::read_all))
        .route("/api/notifications/:id/read", patch(notifications::mark_read))
        .route("/api/notifications/:id", axum::routing::delete(notifications::delete))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
