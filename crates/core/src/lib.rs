//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, lifecycle flags shared by every record,
//! catalog limits and field validation helpers.

pub mod entity;
pub mod error;
pub mod id;
pub mod limits;
pub mod validate;

pub use entity::{Entity, HasLifecycle, LifecycleFlags};
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, CouponId, OrderId, ProductId, StoreId, UserId};
