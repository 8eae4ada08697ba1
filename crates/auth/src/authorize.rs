use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{required}' required")]
    Forbidden { required: Role },
}

/// Role check for guarded routes.
///
/// Admins pass every check; clients only pass client checks.
pub fn require_role(actual: Role, required: Role) -> Result<(), AuthzError> {
    match (actual, required) {
        (Role::Admin, _) | (Role::Client, Role::Client) => Ok(()),
        (Role::Client, Role::Admin) => Err(AuthzError::Forbidden { required }),
    }
}
