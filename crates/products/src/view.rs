//! Outbound projections of [`Product`].
//!
//! Two shapes derived from the same entity: the full view used by lookups and
//! searches, and the public list view that leaves the acquisition cost out.

use serde::Serialize;

use microcommerce_core::{Entity, ProductId};

use crate::product::Product;

/// Full product shape, including `purchasePrice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
    pub purchase_price: i64,
}

/// Public list shape: every field except `purchasePrice`, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListView {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id(),
            name: p.name().to_string(),
            price: p.price(),
            purchase_price: p.purchase_price(),
        }
    }
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self::from(&p)
    }
}

impl From<&Product> for ProductListView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id(),
            name: p.name().to_string(),
            price: p.price(),
        }
    }
}

impl From<Product> for ProductListView {
    fn from(p: Product) -> Self {
        Self::from(&p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bike() -> Product {
        Product::new(ProductId::new(1), "Mountain Bike", 500, 320)
    }

    #[test]
    fn list_view_has_no_purchase_price() {
        let json = serde_json::to_value(ProductListView::from(bike())).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("purchasePrice"));
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Mountain Bike");
        assert_eq!(json["price"], 500);
    }

    #[test]
    fn list_view_keeps_field_order() {
        let json = serde_json::to_string(&ProductListView::from(bike())).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Mountain Bike","price":500}"#);
    }

    #[test]
    fn full_view_includes_purchase_price() {
        let json = serde_json::to_string(&ProductView::from(bike())).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"name":"Mountain Bike","price":500,"purchasePrice":320}"#
        );
    }

    #[test]
    fn projecting_does_not_touch_the_entity() {
        let product = bike();
        let _ = ProductListView::from(&product);
        assert_eq!(product.purchase_price(), 320);
    }
}
