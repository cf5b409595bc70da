use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::rbac::{self, Role};
use crate::state::AppState;

/// The caller, as currently stored. Injected by [`validate_user_middleware`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl CurrentUser {
    /// 403 unless the caller's role covers one of `required`
    pub fn require(&self, required: &[Role]) -> Result<(), ApiError> {
        rbac::require_role(self.role, required)
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

/// Loads the token's user from the datastore. Missing or deactivated users
/// are unauthenticated; the stored role replaces the token's role claim.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let user = match state.store.get_user(auth_user.user_id).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => {
            tracing::warn!("User validation failed: {} ({}) not found", auth_user.email, auth_user.user_id);
            return Err(ApiError::unauthorized("User no longer exists"));
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_active {
        tracing::warn!("User validation failed: {} is deactivated", user.email);
        return Err(ApiError::unauthorized("User account is inactive"));
    }

    if user.role != auth_user.role {
        tracing::debug!(
            "Token role {} for {} superseded by stored role {}",
            auth_user.role,
            user.email,
            user.role
        );
    }

    tracing::debug!("User validation successful: {} ({})", user.email, user.role);

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role: user.role,
    });

    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
