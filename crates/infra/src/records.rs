//! Collection bindings for the domain records.

use uuid::Uuid;

use storefront_auth::User;
use storefront_catalog::{Category, Product, Store};
use storefront_promotions::Coupon;
use storefront_sales::Order;

use crate::repository::Record;

macro_rules! impl_record {
    ($t:ty, $collection:literal) => {
        impl Record for $t {
            const COLLECTION: &'static str = $collection;

            fn key(&self) -> Uuid {
                *self.id.as_uuid()
            }
        }
    };
}

impl_record!(User, "users");
impl_record!(Store, "stores");
impl_record!(Category, "categories");
impl_record!(Product, "products");
impl_record!(Coupon, "coupons");
impl_record!(Order, "orders");
