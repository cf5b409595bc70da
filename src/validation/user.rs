use serde::Deserialize;

use super::ValidationErrors;
use crate::rbac::Role;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

impl UpdateRoleRequest {
    pub fn validate(self) -> Result<Role, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("role", "role is required");
                None
            }
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    errors.add("role", "role must be one of: EXECUTIVE, PROJECT_MANAGER, INSPECTOR");
                    None
                }
            },
        };
        match role {
            Some(role) => errors.finish(role),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_role() {
        let role = UpdateRoleRequest { role: Some("PROJECT_MANAGER".into()) }.validate().unwrap();
        assert_eq!(role, Role::ProjectManager);
    }

    #[test]
    fn invalid_role() {
        let errors = UpdateRoleRequest { role: Some("SUPERUSER".into()) }.validate().unwrap_err();
        assert!(errors.has("role"));
    }
}
