//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories, lifecycle manager and token issuer
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and the success envelope
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{http::HeaderName, Extension, Router};
use tower::ServiceBuilder;

use storefront_auth::JwtValidator;
use storefront_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    build_app_with(services)
}

/// Router over already-wired services.
pub fn build_app_with(services: AppServices) -> anyhow::Result<Router> {
    let header = HeaderName::from_bytes(services.config.auth_header.as_bytes())
        .with_context(|| format!("invalid AUTH_HEADER '{}'", services.config.auth_header))?;
    let jwt: Arc<dyn JwtValidator> = services.jwt.clone();
    let auth_state = middleware::AuthState {
        jwt,
        header,
        users: services.users.clone(),
    };

    let services = Arc::new(services);

    // Protected routes: require a valid token for a live account.
    let protected = routes::protected().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(routes::public()
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services))))
}
