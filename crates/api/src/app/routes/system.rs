use axum::{extract::Extension, http::StatusCode, response::Response};
use serde_json::json;

use crate::app::dto;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn root() -> Response {
    dto::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Response {
    let user = principal.user();
    dto::ok(json!({
        "user_id": user.id,
        "username": user.username,
        "role": user.role,
    }))
}
