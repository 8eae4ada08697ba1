//! Route-level authorization guards.

use axum::http::StatusCode;
use axum::response::Response;

use storefront_auth::{require_role, Role};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Reject the request unless the caller holds `required` (admins hold every role).
pub fn require(principal: &PrincipalContext, required: Role) -> Result<(), Response> {
    require_role(principal.role(), required)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

pub fn require_admin(principal: &PrincipalContext) -> Result<(), Response> {
    require(principal, Role::Admin)
}
