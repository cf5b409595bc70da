//! Route handlers, one module per resource.
//!
//! Every handler behind `/api` receives a [`CurrentUser`] from the
//! validate-user middleware, checks its role set first, then parses and
//! validates the body before touching the datastore.

pub mod analytics;
pub mod approvals;
pub mod audit_logs;
pub mod checklists;
pub mod escalations;
pub mod evidence;
pub mod inspections;
pub mod notifications;
pub mod projects;
pub mod session;
pub mod system;
pub mod users;

use uuid::Uuid;

use crate::api::{PageRequest, Pagination};
use crate::database::models::{Inspection, Project};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::rbac::Role;
use crate::state::AppState;
use crate::validation::ValidationErrors;

pub(crate) fn page_request(state: &AppState, page: Option<u32>, limit: Option<u32>) -> PageRequest {
    Pagination { page, limit }.resolve(&state.config.api)
}

/// Managers see every project; inspectors only those they belong to
pub(crate) fn check_project_access(user: &CurrentUser, project: &Project) -> Result<(), ApiError> {
    if user.is_manager() || project.has_member(user.id) {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not a member of this project"))
    }
}

/// Managers see every inspection; inspectors only their own assignments
pub(crate) fn check_inspection_access(user: &CurrentUser, inspection: &Inspection) -> Result<(), ApiError> {
    if user.is_manager() || inspection.assigned_to == user.id {
        Ok(())
    } else {
        Err(ApiError::forbidden("This inspection is not assigned to you"))
    }
}

pub(crate) async fn load_inspection(state: &AppState, user: &CurrentUser, id: Uuid) -> Result<Inspection, ApiError> {
    let inspection = state.store.get_inspection(id).await?;
    check_inspection_access(user, &inspection)?;
    Ok(inspection)
}

/// Every team member must name an existing user
pub(crate) async fn check_team_members(state: &AppState, members: &[Uuid]) -> Result<(), ApiError> {
    let known = state.store.existing_user_ids(members).await?;
    let mut errors = ValidationErrors::new();
    for (i, id) in members.iter().enumerate() {
        if !known.contains(id) {
            errors.add(&format!("teamMembers[{}]", i), "user does not exist");
        }
    }
    Ok(errors.finish(())?)
}

/// An assignee must be an active inspector on the project team
pub(crate) async fn check_assignee(state: &AppState, project: &Project, assignee: Uuid) -> Result<(), ApiError> {
    let user = match state.store.get_user(assignee).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => {
            return Err(ApiError::field_error("assignedTo", "user does not exist"));
        }
        Err(e) => return Err(e.into()),
    };
    if !user.is_active {
        return Err(ApiError::field_error("assignedTo", "user is not active"));
    }
    if !user.role.satisfies(&[Role::Inspector]) {
        return Err(ApiError::field_error("assignedTo", "user cannot perform inspections"));
    }
    if !project.has_member(assignee) {
        return Err(ApiError::field_error("assignedTo", "user is not a member of this project"));
    }
    Ok(())
}

/// Optional UUID query filter; malformed values are a field error
pub(crate) fn parse_uuid_filter(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => Uuid::parse_str(v)
            .map(Some)
            .map_err(|_| ApiError::field_error(field, format!("{} must be a valid UUID", field))),
    }
}
