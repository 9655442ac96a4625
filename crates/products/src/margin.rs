//! Margin computation for the admin report.

use crate::product::Product;

/// Computes the margin between a sale price and an acquisition cost.
///
/// Injected into the catalog service so pricing policy can be swapped without
/// touching the report itself.
pub trait MarginCalculator: Send + Sync {
    fn margin(&self, price: i64, purchase_price: i64) -> i64;
}

/// `price - purchase_price`, saturating at the `i64` bounds.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StandardMargin;

impl MarginCalculator for StandardMargin {
    fn margin(&self, price: i64, purchase_price: i64) -> i64 {
        price.saturating_sub(purchase_price)
    }
}

/// One row of the margin report.
///
/// Renders as `<product>: <margin>`, e.g. `Product{id=1, name='Tent', price=80}: 50`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginLine {
    pub product: Product,
    pub margin: i64,
}

impl MarginLine {
    pub fn compute<M: MarginCalculator + ?Sized>(calculator: &M, product: Product) -> Self {
        let margin = calculator.margin(product.price(), product.purchase_price());
        Self { product, margin }
    }
}

impl core::fmt::Display for MarginLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.product, self.margin)
    }
}
