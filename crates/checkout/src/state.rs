//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// Why a checkout ended in [`CheckoutState::Rejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    InvalidInput,
    NotFound,
    InsufficientStock,
    PaymentDeclined,
    Cancelled,
    LedgerRejected,
}

impl RejectReason {
    /// Returns the reason as a snake_case label, as used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidInput => "invalid_input",
            RejectReason::NotFound => "not_found",
            RejectReason::InsufficientStock => "insufficient_stock",
            RejectReason::PaymentDeclined => "payment_declined",
            RejectReason::Cancelled => "cancelled",
            RejectReason::LedgerRejected => "ledger_rejected",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state of one checkout attempt.
///
/// State transitions:
/// ```text
/// Idle ──► Validating ──► AwaitingPayment ──► Committing ──► Completed
///               │                │                 │
///               └────────────────┴─────────────────┴──► Rejected(reason)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    #[default]
    Idle,

    /// Cart and payment details are being checked.
    Validating,

    /// Waiting on the payment authorizer.
    AwaitingPayment,

    /// Stock is being reserved and the sale recorded. Not cancellable.
    Committing,

    /// The sale was recorded (terminal state).
    Completed,

    /// The attempt failed; nothing it touched was left changed (terminal state).
    Rejected(RejectReason),
}

impl CheckoutState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: CheckoutState) -> bool {
        use CheckoutState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, AwaitingPayment)
                | (AwaitingPayment, Committing)
                | (Committing, Completed)
                | (Validating | AwaitingPayment | Committing, Rejected(_))
        )
    }

    /// Returns true if a cancellation request is still honored in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            CheckoutState::Idle | CheckoutState::Validating | CheckoutState::AwaitingPayment
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Completed | CheckoutState::Rejected(_))
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "Idle",
            CheckoutState::Validating => "Validating",
            CheckoutState::AwaitingPayment => "AwaitingPayment",
            CheckoutState::Committing => "Committing",
            CheckoutState::Completed => "Completed",
            CheckoutState::Rejected(_) => "Rejected",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutState::Rejected(reason) => write!(f, "Rejected({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(CheckoutState::default(), CheckoutState::Idle);
    }

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            CheckoutState::Idle,
            CheckoutState::Validating,
            CheckoutState::AwaitingPayment,
            CheckoutState::Committing,
            CheckoutState::Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_rejection_transitions() {
        let rejected = CheckoutState::Rejected(RejectReason::InsufficientStock);
        assert!(!CheckoutState::Idle.can_transition_to(rejected));
        assert!(CheckoutState::Validating.can_transition_to(rejected));
        assert!(CheckoutState::AwaitingPayment.can_transition_to(rejected));
        assert!(CheckoutState::Committing.can_transition_to(rejected));
        assert!(!CheckoutState::Completed.can_transition_to(rejected));
        assert!(!rejected.can_transition_to(CheckoutState::Validating));
    }

    #[test]
    fn test_no_skipping_payment() {
        assert!(!CheckoutState::Validating.can_transition_to(CheckoutState::Committing));
        assert!(!CheckoutState::Idle.can_transition_to(CheckoutState::Completed));
    }

    #[test]
    fn test_can_cancel() {
        assert!(CheckoutState::Validating.can_cancel());
        assert!(CheckoutState::AwaitingPayment.can_cancel());
        assert!(!CheckoutState::Committing.can_cancel());
        assert!(!CheckoutState::Completed.can_cancel());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CheckoutState::Committing.is_terminal());
        assert!(CheckoutState::Completed.is_terminal());
        assert!(CheckoutState::Rejected(RejectReason::Cancelled).is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckoutState::AwaitingPayment.to_string(), "AwaitingPayment");
        assert_eq!(
            CheckoutState::Rejected(RejectReason::PaymentDeclined).to_string(),
            "Rejected(payment_declined)"
        );
    }

    #[test]
    fn test_serialization() {
        let state = CheckoutState::Rejected(RejectReason::NotFound);
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
