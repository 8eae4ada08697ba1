//! Store coupons.

pub mod coupon;

pub use coupon::{Coupon, CreateCoupon, UpdateCoupon};
