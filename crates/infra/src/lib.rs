//! Infrastructure layer: document repositories, the lifecycle manager and
//! process configuration.

pub mod config;
pub mod lifecycle;
pub mod records;
pub mod repository;

pub use config::{AdminSeed, AppConfig, ConfigError};
pub use lifecycle::{deactivate, CascadeReport, LifecycleError, LifecycleManager};
pub use repository::{Filter, InMemoryRepository, PostgresRepository, Record, Repository, RepositoryError, UpdateResult};
