//! Products domain module.
//!
//! This crate contains the catalog entity and the rules attached to it,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod margin;
pub mod product;
pub mod view;

pub use margin::{MarginCalculator, MarginLine, StandardMargin};
pub use product::{Product, ProductDraft};
pub use view::{ProductListView, ProductView};
