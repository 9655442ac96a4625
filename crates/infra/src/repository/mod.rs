//! Product persistence boundary.
//!
//! The catalog service only ever talks to [`ProductRepository`]; which store
//! sits behind it (in-memory for dev/tests, Postgres for deployments) is a
//! wiring decision made at startup.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use microcommerce_core::ProductId;
use microcommerce_products::{Product, ProductDraft};

pub use in_memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;

/// Storage failure surfaced by a repository.
///
/// These are infrastructure faults, never "not found": absence is modelled
/// with `Option` / empty vectors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock poisoned")]
    Poisoned,

    #[error("database error in {operation}: {message}")]
    Database { operation: &'static str, message: String },

    #[error("failed to decode {operation} row: {message}")]
    Decode { operation: &'static str, message: String },

    #[error("connection unavailable: {0}")]
    Unavailable(String),

    #[error("no product ids left to allocate")]
    IdsExhausted,
}

/// Product store.
///
/// Ordering contract: `find_all`, `find_by_price_greater_than` and
/// `find_by_name_containing` return products in id order;
/// `find_all_ordered_by_name` sorts case-insensitively by name (lowercased,
/// compared by code point), then by exact name, then by id. No locale
/// collation is involved.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products whose sale price is strictly greater than `threshold`.
    async fn find_by_price_greater_than(
        &self,
        threshold: i64,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Case-insensitive substring match on the name. Wildcard characters in
    /// `term` match literally.
    async fn find_by_name_containing(&self, term: &str) -> Result<Vec<Product>, RepositoryError>;

    async fn find_all_ordered_by_name(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Insert or overwrite. A draft without id gets one assigned; a draft with
    /// an id replaces that row, creating it if missing. Assigned ids are never
    /// reused and always exceed every id stored so far.
    async fn save(&self, draft: ProductDraft) -> Result<Option<Product>, RepositoryError>;

    /// Remove the product with `id`. Missing ids are not an error.
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_price_greater_than(
        &self,
        threshold: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_by_price_greater_than(threshold).await
    }

    async fn find_by_name_containing(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_by_name_containing(term).await
    }

    async fn find_all_ordered_by_name(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_all_ordered_by_name().await
    }

    async fn save(&self, draft: ProductDraft) -> Result<Option<Product>, RepositoryError> {
        (**self).save(draft).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        (**self).delete(id).await
    }
}
