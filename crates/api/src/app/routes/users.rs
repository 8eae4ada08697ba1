//! Account registration and self-service.

use std::sync::Arc;

use axum::{extract::Extension, response::Response, Json};
use chrono::Utc;
use tracing::info;

use storefront_auth::{RegisterUser, UpdateProfile, User};
use storefront_core::UserId;
use storefront_infra::{Filter, Repository};

use crate::app::dto::{self, CascadeView, ChangePasswordRequest, UserView};
use crate::app::errors::{self, ApiResult};
use crate::app::routes::save;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Reject if another active account already holds `username` or `email`.
async fn ensure_unique(
    users: &dyn Repository<User>,
    username: &str,
    email: &str,
    except: Option<UserId>,
) -> Result<(), Response> {
    let taken = users
        .find(
            &Filter::active()
                .any_of("username", username)
                .any_of("email", email),
        )
        .await
        .map_err(errors::repository)?
        .into_iter()
        .any(|u| Some(u.id) != except);
    if taken {
        return Err(errors::conflict("username or email already in use"));
    }
    Ok(())
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterUser>,
) -> ApiResult {
    let user = User::register(body, Utc::now()).map_err(errors::domain)?;
    ensure_unique(services.users.as_ref(), &user.username, &user.email, None).await?;

    let user = services
        .users
        .insert_one(user)
        .await
        .map_err(errors::repository)?;
    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(dto::created(UserView::from(&user)))
}

pub async fn me(Extension(principal): Extension<PrincipalContext>) -> Response {
    dto::ok(UserView::from(principal.user()))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<UpdateProfile>,
) -> ApiResult {
    let mut user = principal.user().clone();
    user.apply_profile(body, Utc::now()).map_err(errors::domain)?;
    ensure_unique(services.users.as_ref(), &user.username, &user.email, Some(user.id)).await?;

    let user = save(services.users.as_ref(), user).await?;
    Ok(dto::ok(UserView::from(&user)))
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult {
    let mut user = principal.user().clone();
    if !user.check_password(&body.current_password) {
        return Err(errors::json_error(
            axum::http::StatusCode::UNAUTHORIZED,
            "unauthorized",
            "current password does not match",
        ));
    }
    user.change_password(&body.password, Utc::now())
        .map_err(errors::domain)?;

    let user = save(services.users.as_ref(), user).await?;
    info!(user_id = %user.id, "password changed");
    Ok(dto::ok(UserView::from(&user)))
}

/// Soft-delete the caller's account and, with it, their store.
pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    let report = services
        .lifecycle
        .delete_user(principal.user_id())
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(CascadeView::from(report)))
}
