//! Catalog service: the read/search/mutate/report rules over products.
//!
//! Every operation is a single request against the injected repository,
//! optionally followed by one write. The service holds no mutable state; any
//! concurrency control belongs to the repository.
//!
//! Permissive behaviour:
//! - `update` saves whatever it is given (no existence check, no validation).
//! - `delete` of a missing id succeeds.
//! - `create` reports `Ok(None)` when the repository save yields nothing.

use thiserror::Error;
use tracing::instrument;

use microcommerce_core::{DomainError, Entity, ProductId};
use microcommerce_products::{
    MarginCalculator, MarginLine, Product, ProductDraft, ProductListView, StandardMargin,
};

use crate::repository::{ProductRepository, RepositoryError};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Lookup by id found nothing.
    #[error("product with id {0} not found")]
    NotFound(ProductId),

    /// A domain rule rejected the input, e.g. a zero or negative sale price
    /// on create.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Product catalog operations over a repository `R`, with margins computed by `M`.
#[derive(Debug)]
pub struct CatalogService<R, M = StandardMargin> {
    repository: R,
    margins: M,
}

impl<R> CatalogService<R>
where
    R: ProductRepository,
{
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            margins: StandardMargin,
        }
    }
}

impl<R, M> CatalogService<R, M>
where
    R: ProductRepository,
    M: MarginCalculator,
{
    pub fn with_margin_calculator(repository: R, margins: M) -> Self {
        Self {
            repository,
            margins,
        }
    }

    /// All products in repository order, without their purchase price.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> CatalogResult<Vec<ProductListView>> {
        let products = self.repository.find_all().await?;
        Ok(products.into_iter().map(ProductListView::from).collect())
    }

    #[instrument(skip(self), fields(product_id = %id), err(level = "debug"))]
    pub async fn get_by_id(&self, id: ProductId) -> CatalogResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Products priced strictly above `threshold`.
    #[instrument(skip(self), err)]
    pub async fn search_by_min_price(&self, threshold: i64) -> CatalogResult<Vec<Product>> {
        Ok(self.repository.find_by_price_greater_than(threshold).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn search_by_name_contains(&self, term: &str) -> CatalogResult<Vec<Product>> {
        Ok(self.repository.find_by_name_containing(term).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn list_ordered_by_name(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.repository.find_all_ordered_by_name().await?)
    }

    /// Validate the price, then save. Returns the assigned id, or `None` when
    /// the repository stored nothing.
    #[instrument(skip(self, draft), fields(name = %draft.name, price = draft.price), err(level = "debug"))]
    pub async fn create(&self, draft: ProductDraft) -> CatalogResult<Option<ProductId>> {
        draft.ensure_positive_price()?;

        match self.repository.save(draft).await? {
            Some(product) => {
                tracing::info!(product_id = %product.id(), "product created");
                Ok(Some(product.id()))
            }
            None => {
                tracing::debug!("save returned no product; nothing created");
                Ok(None)
            }
        }
    }

    /// Upsert-style save of `draft`, as given.
    #[instrument(skip(self, draft), fields(product_id = ?draft.id), err)]
    pub async fn update(&self, draft: ProductDraft) -> CatalogResult<()> {
        let saved = self.repository.save(draft).await?;
        tracing::info!(product_id = ?saved.as_ref().map(Entity::id), "product saved");
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete(&self, id: ProductId) -> CatalogResult<()> {
        match self.repository.find_by_id(id).await? {
            Some(product) => {
                self.repository.delete(product.id()).await?;
                tracing::info!("product deleted");
            }
            None => tracing::debug!("delete of missing product ignored"),
        }
        Ok(())
    }

    /// One line per product, in repository order: the product and its margin.
    #[instrument(skip(self), err)]
    pub async fn margin_report(&self) -> CatalogResult<Vec<MarginLine>> {
        let products = self.repository.find_all().await?;
        Ok(products
            .into_iter()
            .map(|p| MarginLine::compute(&self.margins, p))
            .collect())
    }
}
