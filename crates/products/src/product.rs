use serde::Deserialize;

use microcommerce_core::{DomainError, DomainResult, Entity, ProductId};

/// Catalog product.
///
/// `purchase_price` is the acquisition cost. It stays on the entity even where
/// an outbound shape hides it (see [`crate::view::ProductListView`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    price: i64,
    purchase_price: i64,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: i64, purchase_price: i64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            purchase_price,
        }
    }

    /// Materialise a draft once the repository has settled on its identifier.
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            price: draft.price,
            purchase_price: draft.purchase_price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn purchase_price(&self) -> i64 {
        self.purchase_price
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Product{{id={}, name='{}', price={}}}",
            self.id, self.name, self.price
        )
    }
}

/// A product as submitted by a caller, before the repository has stored it.
///
/// `id` is `None` for a fresh product; when present, a save overwrites the
/// row with that id (or inserts it if missing).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub purchase_price: i64,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: i64, purchase_price: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            purchase_price,
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sale price must be strictly positive for a product to enter the catalog.
    ///
    /// Only checked on creation; updates are stored as given.
    pub fn ensure_positive_price(&self) -> DomainResult<()> {
        if self.price <= 0 {
            return Err(DomainError::InvalidPrice(self.price));
        }
        Ok(())
    }
}

impl From<Product> for ProductDraft {
    fn from(product: Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name,
            price: product.price,
            purchase_price: product.purchase_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_purchase_price() {
        let product = Product::new(ProductId::new(1), "Laptop", 350, 120);
        assert_eq!(product.to_string(), "Product{id=1, name='Laptop', price=350}");
    }

    #[test]
    fn draft_rejects_zero_and_negative_prices() {
        for price in [0, -5, i64::MIN] {
            let err = ProductDraft::new("Freebie", price, 0)
                .ensure_positive_price()
                .unwrap_err();
            assert_eq!(err, DomainError::InvalidPrice(price));
        }
    }

    #[test]
    fn draft_accepts_positive_price() {
        assert!(ProductDraft::new("Tent", 10, 4).ensure_positive_price().is_ok());
        assert!(ProductDraft::new("Pin", 1, 0).ensure_positive_price().is_ok());
    }

    #[test]
    fn draft_deserializes_camel_case_without_id() {
        let draft: ProductDraft = serde_json::from_str(
            r#"{"name":"Mountain Bike","price":500,"purchasePrice":320}"#,
        )
        .unwrap();
        assert_eq!(draft.id, None);
        assert_eq!(draft.name, "Mountain Bike");
        assert_eq!(draft.purchase_price, 320);
    }

    #[test]
    fn from_draft_keeps_fields_and_takes_assigned_id() {
        let draft = ProductDraft::new("Tent", 80, 30).with_id(ProductId::new(99));
        let product = Product::from_draft(ProductId::new(4), draft);
        assert_eq!(product.id(), ProductId::new(4));
        assert_eq!(product.name(), "Tent");
        assert_eq!(product.price(), 80);
        assert_eq!(product.purchase_price(), 30);
    }

    #[test]
    fn product_round_trips_into_draft() {
        let product = Product::new(ProductId::new(2), "Kayak", 900, 600);
        let draft = ProductDraft::from(product.clone());
        assert_eq!(draft.id, Some(ProductId::new(2)));
        assert_eq!(Product::from_draft(ProductId::new(2), draft), product);
    }
}
