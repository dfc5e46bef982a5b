//! Catalog error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Malformed arguments; the caller must fix the input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The referenced product does not exist (or was deleted).
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Not enough stock to satisfy the request. Retrying may succeed once
    /// the product is restocked.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
}

impl CatalogError {
    /// Returns true if retrying after the catalog changes may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::InsufficientStock { .. })
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
