//! Orders domain module.
//!
//! Order records and their status rules. Totals are computed by the pricing
//! engine before an order is placed; this crate only records them.

pub mod order;

pub use order::{Order, OrderStatus, PlaceOrder};
