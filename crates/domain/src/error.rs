//! Domain error types.

use catalog::CatalogError;
use common::ProductId;
use thiserror::Error;

/// Errors that can occur during cart and account operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Cart quantities must be positive and fit in a `u32`.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: u64 },

    /// Role name is not one of ADMIN, SUPPLIER or CUSTOMER.
    #[error("Invalid user role: {0}")]
    UnknownRole(String),

    /// Username or password is wrong. Deliberately does not say which.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A user with this username is already registered.
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    /// Username or password is empty.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// The operation needs a customer session.
    #[error("User {0} is not a customer")]
    NotACustomer(String),

    /// An error reported by the catalog.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Convenience type alias for domain results.
pub type Result<T> = std::result::Result<T, DomainError>;
