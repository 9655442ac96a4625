use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use microcommerce_core::{Entity, ProductId};
use microcommerce_products::{Product, ProductDraft};

use super::{ProductRepository, RepositoryError};

#[derive(Debug)]
struct State {
    products: BTreeMap<ProductId, Product>,
    /// `None` once `i64::MAX` has been handed out or stored.
    next_id: Option<i64>,
}

/// In-memory product store.
///
/// Intended for tests/dev. Ids start at 1 and are never reused; an explicit id
/// on save pushes the counter past it.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    state: RwLock<State>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                products: BTreeMap::new(),
                next_id: Some(1),
            }),
        }
    }

    fn scan<F>(&self, keep: F) -> Result<Vec<Product>, RepositoryError>
    where
        F: Fn(&Product) -> bool,
    {
        let state = self.state.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(state
            .products
            .values()
            .filter(|p| keep(*p))
            .cloned()
            .collect())
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive substring test shared with the Postgres `ILIKE` semantics.
pub(crate) fn name_contains(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

/// Catalog name order: lowercased name, then the exact name, then id.
///
/// Matches the Postgres `ORDER BY lower(name) COLLATE "C", name COLLATE "C", id`.
fn by_name(a: &Product, b: &Product) -> Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.id().cmp(&b.id()))
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.scan(|_| true)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(state.products.get(&id).cloned())
    }

    async fn find_by_price_greater_than(
        &self,
        threshold: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.scan(|p| p.price() > threshold)
    }

    async fn find_by_name_containing(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        self.scan(|p| name_contains(p.name(), term))
    }

    async fn find_all_ordered_by_name(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products = self.scan(|_| true)?;
        products.sort_by(by_name);
        Ok(products)
    }

    async fn save(&self, draft: ProductDraft) -> Result<Option<Product>, RepositoryError> {
        let mut state = self.state.write().map_err(|_| RepositoryError::Poisoned)?;

        // Every stored id is below `next_id` (or `next_id` is spent), so allocation never hands out a taken id.
        let id = match draft.id {
            Some(id) => {
                state.next_id = match (state.next_id, id.get().checked_add(1)) {
                    (Some(next), Some(after)) => Some(next.max(after)),
                    _ => None,
                };
                id
            }
            None => {
                let next = state.next_id.ok_or(RepositoryError::IdsExhausted)?;
                state.next_id = next.checked_add(1);
                ProductId::new(next)
            }
        };

        let product = Product::from_draft(id, draft);
        state.products.insert(product.id(), product.clone());
        Ok(Some(product))
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().map_err(|_| RepositoryError::Poisoned)?;
        state.products.remove(&id);
        Ok(())
    }
}
