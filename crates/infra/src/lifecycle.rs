//! Entity lifecycle manager.
//!
//! Owns the `active`/`enabled` state machine and the cascade
//! User -> Store -> {Products, Coupons}.
//!
//! Every operation checks its preconditions before writing anything, writes the
//! pivot record first, and only then cascades: products are updated and awaited
//! before coupons. A repository failure stops the sequence where it happened and
//! is returned as [`LifecycleError::Infrastructure`]; writes that already
//! succeeded are not rolled back.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use storefront_auth::User;
use storefront_catalog::{Product, Store};
use storefront_core::{HasLifecycle, StoreId, UserId};
use storefront_promotions::Coupon;

use crate::repository::{Filter, Record, Repository, RepositoryError, UpdateResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already in state: {0}")]
    AlreadyInState(String),

    #[error(transparent)]
    Infrastructure(#[from] RepositoryError),
}

/// Writes performed by one store cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub store_id: Option<StoreId>,
    pub products: UpdateResult,
    pub coupons: UpdateResult,
}

fn not_found(collection: &str, id: impl std::fmt::Display) -> LifecycleError {
    debug!(collection, %id, "lifecycle target missing or inactive");
    LifecycleError::NotFound(format!("{collection} {id} not found"))
}

fn already(msg: String) -> LifecycleError {
    debug!(reason = %msg, "lifecycle transition is a no-op");
    LifecycleError::AlreadyInState(msg)
}

fn storage_failure(step: &'static str) -> impl Fn(&RepositoryError) {
    move |err| warn!(step, error = %err, "lifecycle write failed")
}

/// Soft-delete the record matched by `filter`.
///
/// Missing records are `NotFound`, already-inactive ones `AlreadyInState`.
/// Returns the record as it is after the write.
pub async fn deactivate<R: Record>(
    repo: &dyn Repository<R>,
    filter: &Filter,
) -> Result<R, LifecycleError> {
    let Some(mut record) = repo.find_one(filter).await? else {
        debug!(collection = R::COLLECTION, "deactivation target missing");
        return Err(LifecycleError::NotFound(format!("{} record not found", R::COLLECTION)));
    };
    let key = record.key();
    if !record.is_active() {
        return Err(already(format!("{} {key} is already deleted", R::COLLECTION)));
    }

    let result = repo
        .update_one(&Filter::by_id(key).eq("active", true), &|r: &mut R| {
            r.lifecycle_mut().active = false
        })
        .await
        .inspect_err(storage_failure("deactivate"))?;
    if result.matched == 0 {
        return Err(not_found(R::COLLECTION, key));
    }

    record.lifecycle_mut().active = false;
    info!(collection = R::COLLECTION, id = %key, "record deactivated");
    Ok(record)
}

/// Applies lifecycle transitions across the user, store, product and coupon
/// collections.
///
/// Deleting an already deleted record yields `AlreadyInState`, while enabling
/// or disabling an inactive user or store yields `NotFound`.
#[derive(Clone)]
pub struct LifecycleManager {
    users: Arc<dyn Repository<User>>,
    stores: Arc<dyn Repository<Store>>,
    products: Arc<dyn Repository<Product>>,
    coupons: Arc<dyn Repository<Coupon>>,
}

impl LifecycleManager {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        stores: Arc<dyn Repository<Store>>,
        products: Arc<dyn Repository<Product>>,
        coupons: Arc<dyn Repository<Coupon>>,
    ) -> Self {
        Self {
            users,
            stores,
            products,
            coupons,
        }
    }

    /// Set `enabled` on every product, then every coupon, of `store_id`.
    async fn cascade(&self, store_id: StoreId, enabled: bool) -> Result<CascadeReport, LifecycleError> {
        let dependents = Filter::new().eq_id("store_id", store_id);

        let products = self
            .products
            .update_many(&dependents, &move |p: &mut Product| p.lifecycle.enabled = enabled)
            .await
            .inspect_err(storage_failure("cascade_products"))?;

        let coupons = self
            .coupons
            .update_many(&dependents, &move |c: &mut Coupon| c.lifecycle.enabled = enabled)
            .await
            .inspect_err(storage_failure("cascade_coupons"))?;

        info!(
            %store_id,
            enabled,
            products = products.modified,
            coupons = coupons.modified,
            "store cascade applied"
        );
        Ok(CascadeReport {
            store_id: Some(store_id),
            products,
            coupons,
        })
    }

    pub async fn cascade_on_disabled(&self, store_id: StoreId) -> Result<CascadeReport, LifecycleError> {
        self.cascade(store_id, false).await
    }

    pub async fn cascade_on_enabled(&self, store_id: StoreId) -> Result<CascadeReport, LifecycleError> {
        self.cascade(store_id, true).await
    }

    /// Administrative enable/disable of an active store, followed by the cascade.
    pub async fn set_store_enabled(
        &self,
        store_id: StoreId,
        enabled: bool,
    ) -> Result<CascadeReport, LifecycleError> {
        let store = self
            .stores
            .find_one(&Filter::by_id(store_id))
            .await?
            .filter(|s| s.is_active())
            .ok_or_else(|| not_found(Store::COLLECTION, store_id))?;

        if store.is_enabled() == enabled {
            let state = if enabled { "enabled" } else { "disabled" };
            return Err(already(format!("store {store_id} is already {state}")));
        }

        let result = self
            .stores
            .update_one(
                &Filter::by_id(store_id).eq("active", true),
                &move |s: &mut Store| s.lifecycle.enabled = enabled,
            )
            .await
            .inspect_err(storage_failure("set_store_enabled"))?;
        if result.matched == 0 {
            return Err(not_found(Store::COLLECTION, store_id));
        }
        info!(%store_id, enabled, "store enabled flag changed");

        self.cascade(store_id, enabled).await
    }

    pub async fn disable_store(&self, store_id: StoreId) -> Result<CascadeReport, LifecycleError> {
        self.set_store_enabled(store_id, false).await
    }

    pub async fn enable_store(&self, store_id: StoreId) -> Result<CascadeReport, LifecycleError> {
        self.set_store_enabled(store_id, true).await
    }

    /// Soft-delete a store and disable everything it sells.
    pub async fn delete_store(&self, store_id: StoreId) -> Result<CascadeReport, LifecycleError> {
        let store = deactivate(self.stores.as_ref(), &Filter::by_id(store_id)).await?;
        self.cascade_on_disabled(store.id).await
    }

    async fn owned_store(&self, user_id: UserId) -> Result<Option<Store>, LifecycleError> {
        Ok(self
            .stores
            .find_one(&Filter::active().eq_id("owner_id", user_id))
            .await?)
    }

    async fn set_user_enabled(
        &self,
        user_id: UserId,
        enabled: bool,
    ) -> Result<CascadeReport, LifecycleError> {
        let user = self
            .users
            .find_one(&Filter::by_id(user_id))
            .await?
            .filter(|u| u.is_active())
            .ok_or_else(|| not_found(User::COLLECTION, user_id))?;

        if user.is_enabled() == enabled {
            let state = if enabled { "enabled" } else { "disabled" };
            return Err(already(format!("user {user_id} is already {state}")));
        }

        let result = self
            .users
            .update_one(
                &Filter::by_id(user_id).eq("active", true),
                &move |u: &mut User| u.lifecycle.enabled = enabled,
            )
            .await
            .inspect_err(storage_failure("set_user_enabled"))?;
        if result.matched == 0 {
            return Err(not_found(User::COLLECTION, user_id));
        }
        info!(%user_id, enabled, "user enabled flag changed");

        let Some(store) = self.owned_store(user_id).await? else {
            debug!(%user_id, "user owns no store, nothing to cascade");
            return Ok(CascadeReport::default());
        };

        let result = self
            .stores
            .update_one(
                &Filter::by_id(store.id).eq("active", true),
                &move |s: &mut Store| s.lifecycle.enabled = enabled,
            )
            .await
            .inspect_err(storage_failure("set_owned_store_enabled"))?;
        if result.matched == 0 {
            return Err(not_found(Store::COLLECTION, store.id));
        }

        self.cascade(store.id, enabled).await
    }

    /// Suspend a user; their store and its products and coupons go with them.
    pub async fn disable_user(&self, user_id: UserId) -> Result<CascadeReport, LifecycleError> {
        self.set_user_enabled(user_id, false).await
    }

    pub async fn enable_user(&self, user_id: UserId) -> Result<CascadeReport, LifecycleError> {
        self.set_user_enabled(user_id, true).await
    }

    /// Soft-delete a user account and the store it owns.
    pub async fn delete_user(&self, user_id: UserId) -> Result<CascadeReport, LifecycleError> {
        deactivate(self.users.as_ref(), &Filter::by_id(user_id)).await?;

        let Some(store) = self.owned_store(user_id).await? else {
            return Ok(CascadeReport::default());
        };
        self.delete_store(store.id).await
    }

    /// Soft-delete by raw key in one of the managed collections.
    pub async fn deactivate_product(&self, id: impl Into<Uuid>) -> Result<Product, LifecycleError> {
        deactivate(self.products.as_ref(), &Filter::by_id(id)).await
    }

    pub async fn deactivate_coupon(&self, id: impl Into<Uuid>) -> Result<Coupon, LifecycleError> {
        deactivate(self.coupons.as_ref(), &Filter::by_id(id)).await
    }
}
