//! Product catalog for the grocery store core.
//!
//! The catalog is the single source of truth for products and their stock.
//! Every stock mutation funnels through [`ProductCatalog`], which serializes
//! writes per product so that concurrent checkouts competing for the last
//! units can never both succeed.

pub mod catalog;
pub mod error;
pub mod product;
pub mod seed;

pub use catalog::ProductCatalog;
pub use error::{CatalogError, Result};
pub use product::{MAX_UNIT_PRICE, Product, ProductUpdate};
pub use seed::DEFAULT_PRODUCTS;
