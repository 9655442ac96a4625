//! Infrastructure layer: repositories, catalog service wiring, config.

pub mod catalog;
pub mod config;
pub mod repository;

pub use catalog::{CatalogError, CatalogResult, CatalogService};
pub use config::{AppConfig, StorageBackend};
pub use repository::{
    InMemoryProductRepository, PostgresProductRepository, ProductRepository, RepositoryError,
};
