use common::TransactionId;
use thiserror::Error;

/// Errors that can occur when interacting with the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A transaction with this id was already recorded.
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(TransactionId),

    /// No transaction with this id exists.
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// A serialization error occurred while exporting.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
