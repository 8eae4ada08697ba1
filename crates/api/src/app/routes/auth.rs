//! Login and password recovery.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use storefront_auth::User;
use storefront_infra::{Filter, Repository};

use crate::app::dto::{self, LoginRequest, RecoverTokenRequest, RecoverTokenView, RecoveryChangeRequest, SessionView, UserView};
use crate::app::errors::{self, ApiResult};
use crate::app::routes::save;
use crate::app::services::AppServices;

/// Live account whose username or email is `login`.
async fn find_by_login(users: &dyn Repository<User>, login: &str) -> Result<Option<User>, Response> {
    let login = login.trim().to_lowercase();
    users
        .find_one(
            &Filter::live()
                .any_of("username", login.clone())
                .any_of("email", login),
        )
        .await
        .map_err(errors::repository)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult {
    let invalid = || errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid login details");

    let user = find_by_login(services.users.as_ref(), &body.login)
        .await?
        .ok_or_else(invalid)?;
    if !user.check_password(&body.password) {
        debug!(user_id = %user.id, "password mismatch");
        return Err(invalid());
    }

    let token = services.issue_token(&user).map_err(|e| {
        errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
    })?;
    info!(user_id = %user.id, "session issued");
    Ok(dto::ok(SessionView {
        token,
        user: UserView::from(&user),
    }))
}

/// Issue a recovery token. There is no mail channel, so the token is returned
/// to the caller.
pub async fn password_token(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RecoverTokenRequest>,
) -> ApiResult {
    let mut user = find_by_login(services.users.as_ref(), &body.login)
        .await?
        .ok_or_else(|| errors::not_found("user not found"))?;

    let token = Uuid::new_v4().simple().to_string();
    user.begin_recovery(token.clone(), Utc::now(), services.config.recover_token_ttl);
    let user = save(services.users.as_ref(), user).await?;

    info!(user_id = %user.id, "password recovery started");
    Ok(dto::ok(RecoverTokenView {
        token,
        expires_at: user.recover_token_exp,
    }))
}

pub async fn recovery_change(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RecoveryChangeRequest>,
) -> ApiResult {
    let token = body.token.trim();
    if token.is_empty() {
        return Err(errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "token is required"));
    }

    let mut user = services
        .users
        .find_one(&Filter::live().eq("recover_token", token))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found("cannot recover password: invalid token"))?;

    user.complete_recovery(token, &body.password, Utc::now())
        .map_err(errors::domain)?;
    let user = save(services.users.as_ref(), user).await?;

    info!(user_id = %user.id, "password recovered");
    Ok(dto::ok(UserView::from(&user)))
}
