//! The caller's own store. Approval and suspension live under `/admin`.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    Json,
};
use chrono::Utc;
use tracing::info;

use storefront_catalog::{CreateStore, Store, UpdateStore};
use storefront_core::StoreId;
use storefront_infra::{Filter, Repository};

use crate::app::dto::{self, CascadeView};
use crate::app::errors::{self, ApiResult};
use crate::app::routes::save;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Store names and RUTs are unique among active stores.
async fn ensure_unique(
    stores: &dyn Repository<Store>,
    store: &Store,
) -> Result<(), Response> {
    let taken = stores
        .find(
            &Filter::active()
                .any_of("name", store.name.as_str())
                .any_of("rut", store.rut.as_str()),
        )
        .await
        .map_err(errors::repository)?
        .into_iter()
        .any(|s| s.id != store.id);
    if taken {
        return Err(errors::conflict("a store with that name or RUT already exists"));
    }
    Ok(())
}

/// The caller's active store, or 404.
pub(crate) async fn require_store(
    services: &AppServices,
    principal: &PrincipalContext,
) -> Result<Store, Response> {
    services
        .store_of(principal.user_id())
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found("user has no store"))
}

pub async fn get_store(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: StoreId = errors::parse_id(&id)?;
    let store = services
        .live_store(id)
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("store {id} not found")))?;
    Ok(dto::ok(store))
}

pub async fn my_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    let store = require_store(&services, &principal).await?;
    Ok(dto::ok(store))
}

/// Open a store for the caller. It stays disabled until an admin approves it.
pub async fn open_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateStore>,
) -> ApiResult {
    if services
        .store_of(principal.user_id())
        .await
        .map_err(errors::repository)?
        .is_some()
    {
        return Err(errors::conflict("user already owns a store"));
    }

    let store = Store::open(principal.user_id(), body, Utc::now()).map_err(errors::domain)?;
    ensure_unique(services.stores.as_ref(), &store).await?;

    let store = services
        .stores
        .insert_one(store)
        .await
        .map_err(errors::repository)?;
    info!(store_id = %store.id, owner_id = %store.owner_id, "store opened, awaiting approval");
    Ok(dto::created(store))
}

pub async fn update_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<UpdateStore>,
) -> ApiResult {
    let mut store = require_store(&services, &principal).await?;
    store.apply_update(body, Utc::now()).map_err(errors::domain)?;
    ensure_unique(services.stores.as_ref(), &store).await?;

    let store = save(services.stores.as_ref(), store).await?;
    Ok(dto::ok(store))
}

/// Soft-delete the caller's store; its products and coupons are disabled.
pub async fn delete_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    let store = require_store(&services, &principal).await?;
    let report = services
        .lifecycle
        .delete_store(store.id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(CascadeView::from(report)))
}
