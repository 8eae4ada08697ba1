use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{limits, CouponId, ProductId, StoreId};
use storefront_promotions::Coupon;

/// One unit of a product in an order, as seen by the pricing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub price: Decimal,
}

impl LineItem {
    pub fn new(product_id: ProductId, store_id: StoreId, price: Decimal) -> Self {
        Self {
            product_id,
            store_id,
            price,
        }
    }

    /// Snapshot a catalog product with its catalog discount already applied.
    pub fn from_product(product: &Product) -> Self {
        Self::new(product.id, product.store_id, product.effective_price())
    }
}

/// The parts of a coupon the engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponTerms {
    pub coupon_id: CouponId,
    pub store_id: StoreId,
    pub value: Decimal,
    pub percentage: bool,
    pub expiration: DateTime<Utc>,
}

impl CouponTerms {
    /// A coupon is usable up to and including its expiration instant.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        now <= self.expiration
    }

    pub fn applies_to(&self, item: &LineItem) -> bool {
        item.store_id == self.store_id
    }

    /// Reprice one unit; never goes below zero.
    pub fn discount(&self, price: Decimal) -> Decimal {
        let discounted = if self.percentage {
            let pct = self.value.min(limits::max_percentage());
            price * (Decimal::ONE - pct / Decimal::ONE_HUNDRED)
        } else {
            price - self.value
        };
        discounted.max(Decimal::ZERO)
    }
}

impl From<&Coupon> for CouponTerms {
    fn from(coupon: &Coupon) -> Self {
        Self {
            coupon_id: coupon.id,
            store_id: coupon.store_id,
            value: coupon.value,
            percentage: coupon.percentage,
            expiration: coupon.expiration,
        }
    }
}
