use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::validate_user::CurrentUser;
use crate::error::ApiError;
use crate::handlers::load_inspection;
use crate::state::AppState;

/// Guards stored evidence files. Objects live under `<inspection id>/`, so the
/// caller needs the same access as for the inspection itself.
pub async fn evidence_access_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let inspection_id =
        inspection_segment(request.uri().path()).ok_or_else(|| ApiError::not_found("Evidence file not found"))?;
    load_inspection(&state, &user, inspection_id).await?;

    Ok(next.run(request).await)
}

/// First path segment after the optional `/files` mount point
fn inspection_segment(path: &str) -> Option<Uuid> {
    let rest = path.strip_prefix("/files").unwrap_or(path);
    let segment = rest.trim_start_matches('/').split('/').next()?;
    Uuid::parse_str(segment).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspection_id_comes_from_first_segment() {
        let id = Uuid::new_v4();
        assert_eq!(inspection_segment(&format!("/files/{}/e-wall.jpg", id)), Some(id));
        assert_eq!(inspection_segment(&format!("/{}/e-wall.jpg", id)), Some(id));
        assert_eq!(inspection_segment("/files/../etc/passwd"), None);
        assert_eq!(inspection_segment("/files/"), None);
    }
}
