//! Application-level error type.

use catalog::CatalogError;
use checkout::CheckoutError;
use domain::{DomainError, Role};
use ledger::LedgerError;
use thiserror::Error;

/// Errors surfaced by [`StoreContext`](crate::StoreContext) operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// The session's role may not perform this action.
    #[error("{username} ({role}) may not {action}")]
    PermissionDenied {
        username: String,
        role: Role,
        action: &'static str,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Convenience type alias for application results.
pub type Result<T> = std::result::Result<T, AppError>;
