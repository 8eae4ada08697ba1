//! Error responses.
//!
//! Every failure leaves the API as `{"ok": false, "error": {"code", "message"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use storefront_core::DomainError;
use storefront_infra::{LifecycleError, RepositoryError};

/// Handler result: both arms are finished responses.
pub type ApiResult = Result<Response, Response>;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "ok": false,
            "error": {
                "code": code,
                "message": message.into(),
            },
        })),
    )
        .into_response()
}

pub fn not_found(message: impl Into<String>) -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn forbidden(message: impl Into<String>) -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", message)
}

pub fn conflict(message: impl Into<String>) -> Response {
    json_error(StatusCode::CONFLICT, "conflict", message)
}

pub fn domain(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound(msg) => not_found(msg),
        DomainError::AlreadyInState(msg) => {
            json_error(StatusCode::CONFLICT, "already_in_state", msg)
        }
        DomainError::Conflict(msg) => conflict(msg),
        DomainError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
    }
}

pub fn lifecycle(err: LifecycleError) -> Response {
    match err {
        LifecycleError::NotFound(msg) => not_found(msg),
        LifecycleError::AlreadyInState(msg) => {
            json_error(StatusCode::CONFLICT, "already_in_state", msg)
        }
        LifecycleError::Infrastructure(e) => repository(e),
    }
}

pub fn repository(err: RepositoryError) -> Response {
    match err {
        RepositoryError::Duplicate(msg) => conflict(msg),
        RepositoryError::Unavailable(msg) => {
            error!(error = %msg, "storage unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", "storage unavailable")
        }
        other => {
            error!(error = %other, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "internal storage error")
        }
    }
}

/// Parse a path segment into a typed id, answering 400 on garbage.
pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::ProductId;

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(domain(DomainError::validation("x")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(domain(DomainError::not_found("x")).status(), StatusCode::NOT_FOUND);
        assert_eq!(domain(DomainError::already_in_state("x")).status(), StatusCode::CONFLICT);
        assert_eq!(domain(DomainError::Unauthorized).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            domain(DomainError::invariant("x")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn storage_errors_hide_details() {
        let resp = repository(RepositoryError::Storage("relation missing".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            repository(RepositoryError::Duplicate("k".into())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn bad_ids_are_rejected() {
        let err = parse_id::<ProductId>("nope").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(parse_id::<ProductId>(&ProductId::new().to_string()).is_ok());
    }
}
