//! Checkout error types.

use catalog::CatalogError;
use common::{CheckoutId, ProductId, TransactionId};
use ledger::LedgerError;
use thiserror::Error;

use crate::state::{CheckoutState, RejectReason};

/// What went wrong in a failed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutErrorKind {
    /// The cart or the payment details were malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A product in the cart no longer exists.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// A product had fewer units than the cart asks for.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The payment authorizer refused the charge.
    #[error("Payment declined")]
    PaymentDeclined,

    /// The caller cancelled before the commit began.
    #[error("Checkout cancelled")]
    Cancelled,

    /// The ledger already holds a sale with this id; stock was restored.
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(TransactionId),

    /// The ledger refused the sale for another reason; stock was restored.
    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl CheckoutErrorKind {
    /// The reject reason recorded in the state trail.
    pub fn reason(&self) -> RejectReason {
        match self {
            CheckoutErrorKind::InvalidInput(_) => RejectReason::InvalidInput,
            CheckoutErrorKind::NotFound(_) => RejectReason::NotFound,
            CheckoutErrorKind::InsufficientStock { .. } => RejectReason::InsufficientStock,
            CheckoutErrorKind::PaymentDeclined => RejectReason::PaymentDeclined,
            CheckoutErrorKind::Cancelled => RejectReason::Cancelled,
            CheckoutErrorKind::DuplicateTransaction(_) | CheckoutErrorKind::Ledger(_) => {
                RejectReason::LedgerRejected
            }
        }
    }

    /// Returns true if the same request may succeed later without changes.
    ///
    /// Stock can be replenished and a fresh transaction id is drawn on every
    /// attempt. A cancelled checkout can simply be started again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutErrorKind::InsufficientStock { .. }
                | CheckoutErrorKind::Cancelled
                | CheckoutErrorKind::DuplicateTransaction(_)
        )
    }
}

impl From<CatalogError> for CheckoutErrorKind {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidInput(msg) => CheckoutErrorKind::InvalidInput(msg),
            CatalogError::NotFound(id) => CheckoutErrorKind::NotFound(id),
            CatalogError::InsufficientStock {
                product_id,
                requested,
                available,
            } => CheckoutErrorKind::InsufficientStock {
                product_id,
                requested,
                available,
            },
        }
    }
}

impl From<LedgerError> for CheckoutErrorKind {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateTransaction(id) => CheckoutErrorKind::DuplicateTransaction(id),
            other => CheckoutErrorKind::Ledger(other.to_string()),
        }
    }
}

/// A failed checkout attempt.
///
/// Carries the states the attempt went through, ending in
/// [`CheckoutState::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checkout {checkout_id} failed: {kind}")]
pub struct CheckoutError {
    checkout_id: CheckoutId,
    kind: CheckoutErrorKind,
    trail: Vec<CheckoutState>,
}

impl CheckoutError {
    pub(crate) fn new(
        checkout_id: CheckoutId,
        kind: CheckoutErrorKind,
        trail: Vec<CheckoutState>,
    ) -> Self {
        Self {
            checkout_id,
            kind,
            trail,
        }
    }

    pub fn checkout_id(&self) -> CheckoutId {
        self.checkout_id
    }

    pub fn kind(&self) -> &CheckoutErrorKind {
        &self.kind
    }

    pub fn reason(&self) -> RejectReason {
        self.kind.reason()
    }

    /// States visited, from `Idle` to the final `Rejected`.
    pub fn trail(&self) -> &[CheckoutState] {
        &self.trail
    }

    /// The last non-terminal state before the rejection.
    pub fn failed_in(&self) -> CheckoutState {
        self.trail
            .iter()
            .rev()
            .find(|s| !s.is_terminal())
            .copied()
            .unwrap_or_default()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn into_kind(self) -> CheckoutErrorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_map_onto_kinds() {
        let kind: CheckoutErrorKind = CatalogError::InsufficientStock {
            product_id: ProductId::new(2),
            requested: 10,
            available: 5,
        }
        .into();
        assert_eq!(kind.reason(), RejectReason::InsufficientStock);
        assert!(kind.is_retryable());

        let kind: CheckoutErrorKind = CatalogError::NotFound(ProductId::new(9)).into();
        assert_eq!(kind, CheckoutErrorKind::NotFound(ProductId::new(9)));
        assert!(!kind.is_retryable());
    }

    #[test]
    fn test_retryability() {
        assert!(!CheckoutErrorKind::PaymentDeclined.is_retryable());
        assert!(!CheckoutErrorKind::InvalidInput("cart is empty".into()).is_retryable());
        assert!(CheckoutErrorKind::Cancelled.is_retryable());
    }

    #[test]
    fn test_failed_in_reports_last_live_state() {
        let err = CheckoutError::new(
            CheckoutId::new(),
            CheckoutErrorKind::PaymentDeclined,
            vec![
                CheckoutState::Idle,
                CheckoutState::Validating,
                CheckoutState::AwaitingPayment,
                CheckoutState::Rejected(RejectReason::PaymentDeclined),
            ],
        );
        assert_eq!(err.failed_in(), CheckoutState::AwaitingPayment);
        assert_eq!(err.reason(), RejectReason::PaymentDeclined);
        assert!(err.to_string().ends_with("failed: Payment declined"));
    }
}
