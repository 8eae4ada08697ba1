//! Order placement and tracking.
//!
//! Placement resolves the requested product and coupon ids against the live
//! catalog, prices them with the pricing engine and records the result.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    Json,
};
use chrono::Utc;
use tracing::info;

use storefront_auth::Role;
use storefront_core::{CouponId, OrderId, ProductId};
use storefront_infra::Filter;
use storefront_pricing::{quote, CouponTerms, LineItem};
use storefront_sales::{Order, PlaceOrder};

use crate::app::dto::{self, SetOrderStatusRequest};
use crate::app::errors::{self, ApiResult};
use crate::app::routes::save;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

/// One line item per requested id, in request order; repeated ids are extra units.
async fn resolve_items(services: &AppServices, ids: &[ProductId]) -> Result<Vec<LineItem>, Response> {
    let filter = ids
        .iter()
        .fold(Filter::live(), |f, id| f.any_of("id", id.to_string()));
    let found: HashMap<ProductId, LineItem> = services
        .products
        .find(&filter)
        .await
        .map_err(errors::repository)?
        .iter()
        .map(|p| (p.id, LineItem::from_product(p)))
        .collect();

    ids.iter()
        .map(|id| {
            found
                .get(id)
                .copied()
                .ok_or_else(|| errors::not_found(format!("product {id} not found")))
        })
        .collect()
}

async fn resolve_coupons(services: &AppServices, ids: &[CouponId]) -> Result<Vec<CouponTerms>, Response> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let filter = ids
        .iter()
        .fold(Filter::live(), |f, id| f.any_of("id", id.to_string()));
    let found: HashMap<CouponId, CouponTerms> = services
        .coupons
        .find(&filter)
        .await
        .map_err(errors::repository)?
        .iter()
        .map(|c| (c.id, CouponTerms::from(c)))
        .collect();

    ids.iter()
        .map(|id| {
            found
                .get(id)
                .copied()
                .ok_or_else(|| errors::not_found(format!("coupon {id} not found")))
        })
        .collect()
}

/// Active order visible to the caller: their own, or any for admins.
async fn visible_order(services: &AppServices, principal: &PrincipalContext, id: OrderId) -> Result<Order, Response> {
    let mut filter = Filter::active().eq_id("id", id);
    if principal.role() != Role::Admin {
        filter = filter.eq_id("user_id", principal.user_id());
    }
    services
        .orders
        .find_one(&filter)
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("order {id} not found")))
}

pub async fn my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    let orders = services
        .orders
        .find(&Filter::active().eq_id("user_id", principal.user_id()))
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(orders))
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: OrderId = errors::parse_id(&id)?;
    let order = visible_order(&services, &principal, id).await?;
    Ok(dto::ok(order))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<PlaceOrder>,
) -> ApiResult {
    body.validate().map_err(errors::domain)?;
    let now = Utc::now();

    let items = resolve_items(&services, &body.products).await?;
    let coupons = resolve_coupons(&services, &body.coupons).await?;
    let priced = quote(&items, &coupons, now).map_err(errors::domain)?;

    let order = Order::place(principal.user_id(), body, priced.subtotal, priced.total, now)
        .map_err(errors::domain)?;
    let order = services
        .orders
        .insert_one(order)
        .await
        .map_err(errors::repository)?;

    info!(
        order_id = %order.id,
        user_id = %order.user_id,
        subtotal = %order.subtotal,
        total = %order.total,
        "order placed"
    );
    Ok(dto::created(order))
}

pub async fn set_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<SetOrderStatusRequest>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: OrderId = errors::parse_id(&id)?;
    let mut order = visible_order(&services, &principal, id).await?;

    order.set_status(body.status, Utc::now()).map_err(errors::domain)?;
    let order = save(services.orders.as_ref(), order).await?;
    info!(order_id = %order.id, status = %order.status, "order status changed");
    Ok(dto::ok(order))
}

/// Cancel and soft-delete one of the caller's orders. Completed orders keep
/// their status; cancelling twice is a conflict.
pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: OrderId = errors::parse_id(&id)?;
    let mut order = services
        .orders
        .find_one(&Filter::new().eq_id("id", id).eq_id("user_id", principal.user_id()))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("order {id} not found")))?;

    order.cancel(Utc::now()).map_err(errors::domain)?;
    let order = save(services.orders.as_ref(), order).await?;
    info!(order_id = %order.id, status = %order.status, "order cancelled");
    Ok(dto::ok(order))
}
