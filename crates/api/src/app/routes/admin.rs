//! Admin routes: account suspension, store approval and order oversight.
//!
//! Every handler checks `ADMIN_ROLE` first; suspension and approval go
//! through the lifecycle manager so the store cascade always runs.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    routing::{delete, get, post},
    Router,
};

use storefront_core::{StoreId, UserId};
use storefront_infra::Filter;
use storefront_sales::OrderStatus;

use crate::app::dto::{self, CascadeView, StoreQuery, UserView};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/disable", post(disable_user))
        .route("/users/:id/enable", post(enable_user))
        .route("/stores", get(list_stores))
        .route("/stores/:id/enable", post(enable_store))
        .route("/stores/:id/disable", post(disable_store))
        .route("/orders", get(list_orders))
        .route("/orders/:status", get(orders_by_status))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let users = services
        .users
        .find(&Filter::active())
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(users.iter().map(UserView::from).collect::<Vec<_>>()))
}

pub async fn disable_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: UserId = errors::parse_id(&id)?;
    if id == principal.user_id() {
        return Err(errors::forbidden("admins cannot suspend themselves"));
    }
    let report = services
        .lifecycle
        .disable_user(id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(CascadeView::from(report)))
}

pub async fn enable_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: UserId = errors::parse_id(&id)?;
    let report = services
        .lifecycle
        .enable_user(id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(CascadeView::from(report)))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: UserId = errors::parse_id(&id)?;
    if id == principal.user_id() {
        return Err(errors::forbidden("use DELETE /users to close your own account"));
    }
    let report = services
        .lifecycle
        .delete_user(id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(CascadeView::from(report)))
}

pub async fn list_stores(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<StoreQuery>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let mut filter = Filter::active();
    if query.pending {
        filter = filter.eq("enabled", false);
    }
    let stores = services
        .stores
        .find(&filter)
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(stores))
}

/// Approve (or reinstate) a store; its products and coupons follow.
pub async fn enable_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: StoreId = errors::parse_id(&id)?;
    let report = services
        .lifecycle
        .enable_store(id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(CascadeView::from(report)))
}

pub async fn disable_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: StoreId = errors::parse_id(&id)?;
    let report = services
        .lifecycle
        .disable_store(id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(CascadeView::from(report)))
}

/// Full order history, cancelled orders included.
pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let orders = services
        .orders
        .find(&Filter::new())
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(orders))
}

pub async fn orders_by_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(status): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let status: OrderStatus = status.parse().map_err(errors::domain)?;
    let orders = services
        .orders
        .find(&Filter::new().eq("status", status.as_str()))
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(orders))
}
