use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use storefront_auth::{JwtValidator, User};
use storefront_infra::{Filter, Repository};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    /// Header carrying the token (`authorization` unless configured otherwise).
    pub header: HeaderName,
    pub users: Arc<dyn Repository<User>>,
}

fn unauthorized(message: &'static str) -> Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token(req.headers(), &state.header)
        .ok_or_else(|| unauthorized("missing access token"))?
        .to_string();

    let claims = state.jwt.validate(&token, Utc::now()).map_err(|e| {
        debug!(error = %e, "rejected access token");
        unauthorized("invalid access token")
    })?;

    // Disabled or deleted accounts lose access even with an unexpired token.
    let user = state
        .users
        .find_one(&Filter::live().eq_id("id", claims.sub))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| unauthorized("account is disabled or deleted"))?;

    req.extensions_mut().insert(PrincipalContext::new(user));

    Ok(next.run(req).await)
}

/// Accepts both `Bearer <token>` and a bare token.
fn extract_token<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    let value = headers.get(name)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_prefix_is_optional() {
        let name = HeaderName::from_static("x-token");
        let mut headers = HeaderMap::new();
        headers.insert(name.clone(), HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers, &name), Some("abc.def"));

        headers.insert(name.clone(), HeaderValue::from_static("abc.def"));
        assert_eq!(extract_token(&headers, &name), Some("abc.def"));

        headers.insert(name.clone(), HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_token(&headers, &name), None);
    }
}
