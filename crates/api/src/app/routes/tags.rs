use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::Extension;

use storefront_infra::Filter;

use crate::app::dto;
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;

/// Distinct tags of live products, sorted.
pub async fn list_tags(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let products = services
        .products
        .find(&Filter::live())
        .await
        .map_err(errors::repository)?;
    let tags: BTreeSet<String> = products.into_iter().flat_map(|p| p.tags).collect();
    Ok(dto::ok(tags))
}
