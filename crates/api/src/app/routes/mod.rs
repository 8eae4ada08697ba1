use axum::{
    response::Response,
    routing::{get, post, put},
    Router,
};

use storefront_infra::{Filter, Record, Repository};

use crate::app::errors;

pub mod admin;
pub mod auth;
pub mod categories;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod stores;
pub mod system;
pub mod tags;
pub mod users;

/// Endpoints open to anonymous callers.
pub fn public() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/login", post(auth::login))
        .route("/password/token", post(auth::password_token))
        .route("/password/recovery-change", post(auth::recovery_change))
        .route("/users", post(users::register))
        .route("/stores/:id", get(stores::get_store))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/categories", get(categories::list_categories))
        .route("/categories/:id", get(categories::subcategories))
        .route("/categories/:id/products", get(categories::category_products))
        .route("/coupons/:coupon", get(coupons::coupons_by_name))
        .route("/tags", get(tags::list_tags))
}

/// Endpoints for authenticated, live accounts.
pub fn protected() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route(
            "/users",
            get(users::me).put(users::update_profile).delete(users::delete_account),
        )
        .route("/users/password", put(users::change_password))
        .route(
            "/stores",
            get(stores::my_store)
                .post(stores::open_store)
                .put(stores::update_store)
                .delete(stores::delete_store),
        )
        .route("/products", post(products::create_product))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route("/coupons", get(coupons::my_coupons).post(coupons::create_coupon))
        .route(
            "/coupons/:coupon",
            put(coupons::update_coupon).delete(coupons::delete_coupon),
        )
        .route("/orders", get(orders::my_orders).post(orders::place_order))
        .route(
            "/orders/:id",
            get(orders::get_order)
                .put(orders::set_order_status)
                .delete(orders::cancel_order),
        )
        .nest("/admin", admin::router())
}

/// Overwrite the active record sharing `record`'s key.
pub(crate) async fn save<R: Record>(repo: &dyn Repository<R>, record: R) -> Result<R, Response> {
    let key = record.key();
    let replacement = record.clone();
    let result = repo
        .update_one(&Filter::by_id(key).eq("active", true), &move |r: &mut R| {
            *r = replacement.clone()
        })
        .await
        .map_err(errors::repository)?;
    if result.matched == 0 {
        return Err(errors::not_found(format!("{} {key} not found", R::COLLECTION)));
    }
    Ok(record)
}
