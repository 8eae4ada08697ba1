//! Category tree. Reads are public; writes are admin-only.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use storefront_catalog::{Category, CreateCategory, UpdateCategory};
use storefront_core::CategoryId;
use storefront_infra::{deactivate, Filter, Repository};

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::save;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

async fn find_category(categories: &dyn Repository<Category>, id: CategoryId) -> Result<Category, Response> {
    categories
        .find_one(&Filter::active().eq_id("id", id))
        .await
        .map_err(errors::repository)?
        .ok_or_else(|| errors::not_found(format!("category {id} not found")))
}

async fn ensure_unique_name(categories: &dyn Repository<Category>, category: &Category) -> Result<(), Response> {
    let taken = categories
        .find(&Filter::active().eq("name", category.name.as_str()))
        .await
        .map_err(errors::repository)?
        .into_iter()
        .any(|c| c.id != category.id);
    if taken {
        return Err(errors::conflict(format!("category '{}' already exists", category.name)));
    }
    Ok(())
}

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let categories = services
        .categories
        .find(&Filter::active())
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(categories))
}

pub async fn subcategories(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: CategoryId = errors::parse_id(&id)?;
    let children = services
        .categories
        .find(&Filter::active().eq_id("parent_id", id))
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(children))
}

pub async fn category_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: CategoryId = errors::parse_id(&id)?;
    let products = services
        .products
        .find(&Filter::live().eq_id("category_id", id))
        .await
        .map_err(errors::repository)?;
    Ok(dto::ok(products))
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateCategory>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    if let Some(parent) = body.parent_id {
        find_category(services.categories.as_ref(), parent).await?;
    }

    let category = Category::create(body, Utc::now()).map_err(errors::domain)?;
    ensure_unique_name(services.categories.as_ref(), &category).await?;

    let category = services
        .categories
        .insert_one(category)
        .await
        .map_err(errors::repository)?;
    info!(category_id = %category.id, "category created");
    Ok(dto::created(category))
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategory>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: CategoryId = errors::parse_id(&id)?;
    let mut category = find_category(services.categories.as_ref(), id).await?;
    if let Some(parent) = body.parent_id {
        find_category(services.categories.as_ref(), parent).await?;
    }

    category.apply_update(body, Utc::now()).map_err(errors::domain)?;
    ensure_unique_name(services.categories.as_ref(), &category).await?;

    let category = save(services.categories.as_ref(), category).await?;
    Ok(dto::ok(category))
}

/// Soft-delete a category and its direct subcategories.
pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let id: CategoryId = errors::parse_id(&id)?;

    let category = deactivate(services.categories.as_ref(), &Filter::by_id(id))
        .await
        .map_err(errors::lifecycle)?;
    let children = services
        .categories
        .update_many(
            &Filter::active().eq_id("parent_id", id),
            &|c: &mut Category| c.lifecycle.active = false,
        )
        .await
        .map_err(errors::repository)?;

    info!(category_id = %id, subcategories = children.modified, "category deleted");
    Ok(dto::ok(json!({
        "category": category,
        "subcategories_deleted": children.modified,
    })))
}
