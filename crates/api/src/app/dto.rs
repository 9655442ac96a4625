use microcommerce_core::ProductId;
use microcommerce_products::{MarginLine, Product, ProductView};

// -------------------------
// JSON mapping helpers
// -------------------------

/// Full projections, including `purchasePrice`.
pub fn products_to_views(products: Vec<Product>) -> Vec<ProductView> {
    products.into_iter().map(ProductView::from).collect()
}

/// Margin report rows as display strings: `Product{...}: <margin>`.
pub fn margin_lines_to_json(lines: Vec<MarginLine>) -> Vec<String> {
    lines.iter().map(ToString::to_string).collect()
}

pub fn created_to_json(id: ProductId) -> serde_json::Value {
    serde_json::json!({ "id": id })
}
