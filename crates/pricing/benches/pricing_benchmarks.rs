use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use storefront_core::{CouponId, ProductId, StoreId};
use storefront_pricing::{apply_coupons, quote, CouponTerms, LineItem};

/// Orders spread over a handful of stores, one percentage and one flat coupon per store.
fn fixture(units: usize, stores: usize) -> (Vec<LineItem>, Vec<CouponTerms>) {
    let store_ids: Vec<StoreId> = (0..stores).map(|_| StoreId::new()).collect();
    let expiration = Utc::now() + Duration::days(30);

    let items = (0..units)
        .map(|i| {
            LineItem::new(
                ProductId::new(),
                store_ids[i % stores],
                Decimal::new(1_999 + i as i64, 2),
            )
        })
        .collect();

    let coupons = store_ids
        .iter()
        .flat_map(|s| {
            [
                CouponTerms {
                    coupon_id: CouponId::new(),
                    store_id: *s,
                    value: Decimal::from(15),
                    percentage: true,
                    expiration,
                },
                CouponTerms {
                    coupon_id: CouponId::new(),
                    store_id: *s,
                    value: Decimal::from(2),
                    percentage: false,
                    expiration,
                },
            ]
        })
        .collect();

    (items, coupons)
}

fn bench_apply_coupons(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_coupons");
    let now = Utc::now();

    for units in [10usize, 100, 1_000] {
        let (items, coupons) = fixture(units, 5);
        group.throughput(Throughput::Elements(units as u64));
        group.bench_with_input(BenchmarkId::from_parameter(units), &units, |b, _| {
            b.iter(|| apply_coupons(black_box(&coupons), black_box(&items), now))
        });
    }
    group.finish();
}

fn bench_quote(c: &mut Criterion) {
    let now = Utc::now();
    let (items, coupons) = fixture(100, 5);
    c.bench_function("quote_100_units", |b| {
        b.iter(|| quote(black_box(&items), black_box(&coupons), now))
    });
}

criterion_group!(benches, bench_apply_coupons, bench_quote);
criterion_main!(benches);
