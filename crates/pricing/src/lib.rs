//! Pricing engine.
//!
//! Pure functions over value snapshots: nothing here reads storage or mutates
//! the caller's catalog records. Order placement resolves products and coupons,
//! builds [`LineItem`]s and [`CouponTerms`], then asks for a [`Quote`].

pub mod engine;
pub mod item;

pub use engine::{apply_coupons, compute_subtotal, quote, CouponApplication, Quote};
pub use item::{CouponTerms, LineItem};
