use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    Json,
};
use chrono::Utc;
use tracing::info;

use storefront_catalog::Store;
use storefront_core::CouponId;
use storefront_infra::{Filter, Repository};
use storefront_promotions::{Coupon, CreateCoupon, UpdateCoupon};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::{save, stores::require_store};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Coupon names are unique among a store's active coupons, enabled or not.
async fn ensure_unique_name(coupons: &dyn Repository<Coupon>, coupon: &Coupon) -> Result<(), Response> {
    let taken = coupons
        .find(
            &Filter::active()
                .eq_id("store_id", coupon.store_id)
                .eq("name", coupon.name.as_str()),
        )
        .await
        .map_err(errors::repository)?
        .into_iter()
        .any(|c| c.id != coupon.id);
    if taken {
        return Err(errors::conflict(format!("coupon '{}' already exists", coupon.name)));
    }
    Ok(())
}

async fn owned_coupon(services: &AppServices, store: &Store, id: CouponId) -> Result<Coupon, Response> {
    services
        .coupons
        .find_one(&Filter::live().eq_id("id", id).eq_id("store_id", store.id))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("coupon {id} not found")))
}

/// Live, unexpired coupons called `name`, across stores.
pub async fn coupons_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> ApiResult {
    let now = Utc::now();
    let mut coupons = services
        .coupons
        .find(&Filter::live().eq("name", name.trim()))
        .await
        .map_err(errors::repository)?;
    coupons.retain(|c| !c.is_expired(now));

    if coupons.is_empty() {
        return Err(errors::not_found(format!("coupon '{}' not found", name.trim())));
    }
    Ok(dto::ok(coupons))
}

/// Every coupon of the caller's store, suspended ones included.
pub async fn my_coupons(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    let store = require_store(&services, &principal).await?;
    let coupons = services
        .coupons
        .find(&Filter::active().eq_id("store_id", store.id))
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(coupons))
}

pub async fn create_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateCoupon>,
) -> ApiResult {
    let store = require_store(&services, &principal).await?;
    let mut coupon = Coupon::issue(store.id, body, Utc::now()).map_err(errors::domain)?;
    // Coupons of a suspended store start suspended with it.
    coupon.lifecycle.enabled = store.lifecycle.enabled;
    ensure_unique_name(services.coupons.as_ref(), &coupon).await?;

    let coupon = services
        .coupons
        .insert_one(coupon)
        .await
        .map_err(errors::repository)?;
    info!(coupon_id = %coupon.id, store_id = %store.id, "coupon issued");
    Ok(dto::created(coupon))
}

pub async fn update_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCoupon>,
) -> ApiResult {
    let id: CouponId = errors::parse_id(&id)?;
    let store = require_store(&services, &principal).await?;
    let mut coupon = owned_coupon(&services, &store, id).await?;

    coupon.apply_update(body, Utc::now()).map_err(errors::domain)?;
    ensure_unique_name(services.coupons.as_ref(), &coupon).await?;

    let coupon = save(services.coupons.as_ref(), coupon).await?;
    Ok(dto::ok(coupon))
}

pub async fn delete_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: CouponId = errors::parse_id(&id)?;
    let store = require_store(&services, &principal).await?;
    owned_coupon(&services, &store, id).await?;

    let coupon = services
        .lifecycle
        .deactivate_coupon(id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(coupon))
}
