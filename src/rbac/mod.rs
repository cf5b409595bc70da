use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Application roles. Stored in `users.role` and carried in session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Executive,
    ProjectManager,
    Inspector,
}

/// Roles allowed to decide on inspections and manage projects
pub const MANAGERS: &[Role] = &[Role::ProjectManager, Role::Executive];

/// Any authenticated role
pub const ANY_ROLE: &[Role] = &[Role::Inspector, Role::Executive];

pub const EXECUTIVES: &[Role] = &[Role::Executive];

impl Role {
    pub const ALL: &'static [Role] = &[Role::Executive, Role::ProjectManager, Role::Inspector];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Executive => "EXECUTIVE",
            Role::ProjectManager => "PROJECT_MANAGER",
            Role::Inspector => "INSPECTOR",
        }
    }

    /// Roles whose access this role carries. A project manager inherits
    /// inspector-level access; an executive only covers its own scope.
    pub fn scope(self) -> &'static [Role] {
        match self {
            Role::Executive => &[Role::Executive],
            Role::ProjectManager => &[Role::ProjectManager, Role::Inspector],
            Role::Inspector => &[Role::Inspector],
        }
    }

    /// True when any role in `required` falls within this role's scope
    pub fn satisfies(self, required: &[Role]) -> bool {
        self.scope().iter().any(|r| required.contains(r))
    }

    pub fn is_manager(self) -> bool {
        self.satisfies(MANAGERS)
    }
}

/// Every role admitted by a required role set
pub fn hierarchy_expansion(required: &[Role]) -> Vec<Role> {
    Role::ALL
        .iter()
        .copied()
        .filter(|role| role.satisfies(required))
        .collect()
}

/// Gate a handler on a role set. 403 when the caller's role is not admitted.
pub fn require_role(role: Role, required: &[Role]) -> Result<(), ApiError> {
    if role.satisfies(required) {
        return Ok(());
    }
    let names: Vec<&str> = required.iter().map(|r| r.as_str()).collect();
    tracing::debug!(role = role.as_str(), required = ?names, "role check failed");
    Err(ApiError::forbidden(format!(
        "Insufficient permissions: requires one of {}",
        names.join(", ")
    )))
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXECUTIVE" => Ok(Role::Executive),
            "PROJECT_MANAGER" => Ok(Role::ProjectManager),
            "INSPECTOR" => Ok(Role::Inspector),
            other => anyhow::bail!("unknown role: {other}"),
        }
    }
}
