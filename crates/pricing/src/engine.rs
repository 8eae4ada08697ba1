use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult};

use crate::item::{CouponTerms, LineItem};

/// Result of [`apply_coupons`]: repriced copies of the input plus their sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponApplication {
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

/// Order amounts, rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub total: Decimal,
    /// Post-coupon prices, unrounded.
    pub lines: Vec<LineItem>,
}

fn check_prices(items: &[LineItem]) -> DomainResult<()> {
    match items.iter().find(|i| i.price < Decimal::ZERO) {
        Some(item) => Err(DomainError::validation(format!(
            "product {} has a negative price",
            item.product_id
        ))),
        None => Ok(()),
    }
}

/// Sum of unit prices. Zero for an empty order.
pub fn compute_subtotal(items: &[LineItem]) -> DomainResult<Decimal> {
    check_prices(items)?;
    Ok(items.iter().map(|i| i.price).sum())
}

/// Apply `coupons` in order to every unit of the issuing store.
///
/// Expired coupons and coupons of other stores are skipped. Eligible coupons
/// stack: each one reprices the result of the previous one.
pub fn apply_coupons(
    coupons: &[CouponTerms],
    items: &[LineItem],
    now: DateTime<Utc>,
) -> DomainResult<CouponApplication> {
    if items.is_empty() {
        return Err(DomainError::validation("cannot apply coupons to an empty order"));
    }
    check_prices(items)?;
    if let Some(c) = coupons.iter().find(|c| c.value < Decimal::ZERO) {
        return Err(DomainError::validation(format!(
            "coupon {} has a negative value",
            c.coupon_id
        )));
    }

    let mut repriced = items.to_vec();
    for coupon in coupons.iter().filter(|c| c.is_eligible(now)) {
        for item in repriced.iter_mut().filter(|i| coupon.applies_to(i)) {
            item.price = coupon.discount(item.price);
        }
    }

    let total = repriced.iter().map(|i| i.price).sum();
    Ok(CouponApplication {
        items: repriced,
        total,
    })
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Subtotal and total for an order.
pub fn quote(
    items: &[LineItem],
    coupons: &[CouponTerms],
    now: DateTime<Utc>,
) -> DomainResult<Quote> {
    let subtotal = compute_subtotal(items)?;
    let applied = apply_coupons(coupons, items, now)?;
    Ok(Quote {
        subtotal: to_cents(subtotal),
        total: to_cents(applied.total),
        lines: applied.items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::str::FromStr;
    use storefront_core::{CouponId, ProductId, StoreId};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn item(price: &str, store: StoreId) -> LineItem {
        LineItem::new(ProductId::new(), store, dec(price))
    }

    fn coupon(value: &str, percentage: bool, store: StoreId, expiration: DateTime<Utc>) -> CouponTerms {
        CouponTerms {
            coupon_id: CouponId::new(),
            store_id: store,
            value: dec(value),
            percentage,
            expiration,
        }
    }

    #[test]
    fn subtotal_of_nothing_is_zero() {
        assert_eq!(compute_subtotal(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn subtotal_sums_every_unit() {
        let s = StoreId::new();
        let items = [item("10", s), item("5", s)];
        assert_eq!(compute_subtotal(&items).unwrap(), dec("15"));
    }

    #[test]
    fn negative_price_is_invalid_input() {
        let items = [item("-1", StoreId::new())];
        assert!(matches!(compute_subtotal(&items), Err(DomainError::Validation(_))));
        assert!(matches!(
            apply_coupons(&[], &items, now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn empty_order_is_invalid_for_coupons() {
        assert!(matches!(
            apply_coupons(&[], &[], now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn negative_coupon_value_is_invalid_input() {
        let s = StoreId::new();
        let c = coupon("-5", false, s, now() + Duration::days(1));
        assert!(apply_coupons(&[c], &[item("10", s)], now()).is_err());
    }

    #[test]
    fn flat_coupon_floors_at_zero() {
        let s = StoreId::new();
        let c = coupon("30", false, s, now() + Duration::days(1));
        let out = apply_coupons(&[c], &[item("100", s), item("20", s)], now()).unwrap();
        assert_eq!(out.items[0].price, dec("70"));
        assert_eq!(out.items[1].price, Decimal::ZERO);
        assert_eq!(out.total, dec("70"));
    }

    #[test]
    fn coupon_for_other_store_is_a_no_op() {
        let items = [item("100", StoreId::new())];
        let c = coupon("50", true, StoreId::new(), now() + Duration::days(1));
        let out = apply_coupons(&[c], &items, now()).unwrap();
        assert_eq!(out.total, compute_subtotal(&items).unwrap());
    }

    #[test]
    fn expired_coupon_never_applies() {
        let s = StoreId::new();
        let c = coupon("50", true, s, now() - Duration::seconds(1));
        let out = apply_coupons(&[c], &[item("100", s)], now()).unwrap();
        assert_eq!(out.total, dec("100"));
    }

    #[test]
    fn coupon_is_usable_at_its_expiration_instant() {
        let s = StoreId::new();
        let c = coupon("50", true, s, now());
        let out = apply_coupons(&[c], &[item("100", s)], now()).unwrap();
        assert_eq!(out.total, dec("50"));
    }

    #[test]
    fn stacked_percentages_compound() {
        let s = StoreId::new();
        let exp = now() + Duration::days(1);
        let coupons = [coupon("50", true, s, exp), coupon("50", true, s, exp)];
        let out = apply_coupons(&coupons, &[item("100", s)], now()).unwrap();
        assert_eq!(out.total, dec("25"));
    }

    #[test]
    fn percentage_above_hundred_is_clamped() {
        let s = StoreId::new();
        let c = coupon("250", true, s, now() + Duration::days(1));
        let out = apply_coupons(&[c], &[item("40", s)], now()).unwrap();
        assert_eq!(out.total, Decimal::ZERO);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let s = StoreId::new();
        let items = vec![item("100", s)];
        let c = coupon("10", true, s, now() + Duration::days(1));
        let _ = apply_coupons(&[c], &items, now()).unwrap();
        assert_eq!(items[0].price, dec("100"));
    }

    #[test]
    fn mixed_stores_quote() {
        let s1 = StoreId::new();
        let s2 = StoreId::new();
        let items = [item("100", s1), item("50", s2)];
        let c = coupon("20", true, s1, now() + Duration::days(30));

        let q = quote(&items, &[c], now()).unwrap();
        assert_eq!(q.subtotal, dec("150"));
        assert_eq!(q.total, dec("130"));
        assert_eq!(q.lines[1].price, dec("50"));
    }

    #[test]
    fn quote_rounds_to_cents() {
        let s = StoreId::new();
        let c = coupon("33", true, s, now() + Duration::days(1));
        let q = quote(&[item("10.005", s)], &[c], now()).unwrap();
        assert_eq!(q.subtotal, dec("10.01"));
        // 10.005 * 0.67 = 6.70335
        assert_eq!(q.total, dec("6.70"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn cents() -> impl Strategy<Value = Decimal> {
            (1i64..=100_000_000).prop_map(|c| Decimal::new(c, 2))
        }

        fn percent() -> impl Strategy<Value = Decimal> {
            (0i64..=10_000).prop_map(|c| Decimal::new(c, 2))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            #[test]
            fn percentage_result_stays_within_original(price in cents(), pct in percent()) {
                let s = StoreId::new();
                let c = coupon("0", true, s, now() + Duration::days(1));
                let c = CouponTerms { value: pct, ..c };
                let out = apply_coupons(&[c], &[LineItem::new(ProductId::new(), s, price)], now()).unwrap();
                prop_assert!(out.total >= Decimal::ZERO);
                prop_assert!(out.total <= price);
            }

            #[test]
            fn flat_result_is_price_minus_value_floored(price in cents(), value in cents()) {
                let s = StoreId::new();
                let c = coupon("0", false, s, now() + Duration::days(1));
                let c = CouponTerms { value, ..c };
                let out = apply_coupons(&[c], &[LineItem::new(ProductId::new(), s, price)], now()).unwrap();
                prop_assert_eq!(out.total, (price - value).max(Decimal::ZERO));
            }

            #[test]
            fn foreign_coupon_leaves_total_at_subtotal(
                prices in prop::collection::vec(cents(), 1..10),
                pct in percent(),
            ) {
                let s = StoreId::new();
                let items: Vec<LineItem> = prices
                    .iter()
                    .map(|p| LineItem::new(ProductId::new(), s, *p))
                    .collect();
                let c = coupon("0", true, StoreId::new(), now() + Duration::days(1));
                let c = CouponTerms { value: pct, ..c };
                let out = apply_coupons(&[c], &items, now()).unwrap();
                prop_assert_eq!(out.total, compute_subtotal(&items).unwrap());
            }

            #[test]
            fn expired_coupon_leaves_total_at_subtotal(
                prices in prop::collection::vec(cents(), 1..10),
                value in cents(),
                percentage in any::<bool>(),
                secs_ago in 1i64..1_000_000,
            ) {
                let s = StoreId::new();
                let items: Vec<LineItem> = prices
                    .iter()
                    .map(|p| LineItem::new(ProductId::new(), s, *p))
                    .collect();
                let c = coupon("0", percentage, s, now() - Duration::seconds(secs_ago));
                let c = CouponTerms { value, ..c };
                let out = apply_coupons(&[c], &items, now()).unwrap();
                prop_assert_eq!(out.total, compute_subtotal(&items).unwrap());
            }
        }
    }
}
