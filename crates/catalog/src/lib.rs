//! Catalog domain module.
//!
//! Stores, categories and products as plain records plus the validation rules
//! for creating and editing them. No IO, no HTTP, no storage.

pub mod category;
pub mod product;
pub mod store;

pub use category::{Category, CreateCategory, UpdateCategory};
pub use product::{CreateProduct, Product, UpdateProduct};
pub use store::{CreateStore, Store, UpdateStore};
