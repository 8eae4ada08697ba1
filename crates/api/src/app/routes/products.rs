use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
    Json,
};
use chrono::Utc;
use tracing::info;

use storefront_catalog::{Category, CreateProduct, Product, Store, UpdateProduct};
use storefront_core::{CategoryId, ProductId};
use storefront_infra::{Filter, Repository};

use crate::app::dto::{self, ProductQuery};
use crate::app::errors::{self, ApiResult};
use crate::app::routes::{save, stores::require_store};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// The caller's store, which must be approved before it can manage products.
async fn approved_store(services: &AppServices, principal: &PrincipalContext) -> Result<Store, Response> {
    let store = require_store(services, principal).await?;
    if !store.is_approved() {
        return Err(errors::json_error(
            axum::http::StatusCode::FORBIDDEN,
            "store_not_approved",
            "store is awaiting approval or suspended",
        ));
    }
    Ok(store)
}

async fn ensure_category(categories: &dyn Repository<Category>, id: CategoryId) -> Result<(), Response> {
    categories
        .find_one(&Filter::active().eq_id("id", id))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("category {id} not found")))?;
    Ok(())
}

/// Product names are unique among a store's live products.
async fn ensure_unique_name(products: &dyn Repository<Product>, product: &Product) -> Result<(), Response> {
    let taken = products
        .find(
            &Filter::live()
                .eq_id("store_id", product.store_id)
                .eq("name", product.name.as_str()),
        )
        .await
        .map_err(errors::repository)?
        .into_iter()
        .any(|p| p.id != product.id);
    if taken {
        return Err(errors::conflict(format!("product '{}' already exists", product.name)));
    }
    Ok(())
}

async fn owned_product(services: &AppServices, store: &Store, id: ProductId) -> Result<Product, Response> {
    services
        .products
        .find_one(&Filter::live().eq_id("id", id).eq_id("store_id", store.id))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("product {id} not found")))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ProductQuery>,
) -> ApiResult {
    let mut filter = Filter::live();
    if let Some(store_id) = query.store_id {
        filter = filter.eq_id("store_id", store_id);
    }
    if let Some(category_id) = query.category_id {
        filter = filter.eq_id("category_id", category_id);
    }

    let mut products = services
        .products
        .find(&filter)
        .await
        .map_err(errors::repository)?;
    if let Some(tag) = query.tag.map(|t| t.trim().to_lowercase()) {
        products.retain(|p| p.tags.contains(&tag));
    }
    Ok(dto::ok(products))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ProductId = errors::parse_id(&id)?;
    let product = services
        .products
        .find_one(&Filter::live().eq_id("id", id))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("product {id} not found")))?;
    Ok(dto::ok(product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateProduct>,
) -> ApiResult {
    let store = approved_store(&services, &principal).await?;
    ensure_category(services.categories.as_ref(), body.category_id).await?;

    let product = Product::list(store.id, body, Utc::now()).map_err(errors::domain)?;
    ensure_unique_name(services.products.as_ref(), &product).await?;

    let product = services
        .products
        .insert_one(product)
        .await
        .map_err(errors::repository)?;
    info!(product_id = %product.id, store_id = %store.id, "product listed");
    Ok(dto::created(product))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProduct>,
) -> ApiResult {
    let id: ProductId = errors::parse_id(&id)?;
    let store = approved_store(&services, &principal).await?;
    let mut product = owned_product(&services, &store, id).await?;

    if let Some(category_id) = body.category_id {
        ensure_category(services.categories.as_ref(), category_id).await?;
    }
    product.apply_update(body, Utc::now()).map_err(errors::domain)?;
    ensure_unique_name(services.products.as_ref(), &product).await?;

    let product = save(services.products.as_ref(), product).await?;
    Ok(dto::ok(product))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ProductId = errors::parse_id(&id)?;
    let store = approved_store(&services, &principal).await?;
    owned_product(&services, &store, id).await?;

    let product = services
        .lifecycle
        .deactivate_product(id)
        .await
        .map_err(errors::lifecycle)?;
    Ok(dto::ok(product))
}
