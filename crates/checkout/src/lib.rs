//! Checkout for the grocery store core.
//!
//! A checkout moves through a small state machine:
//!
//! 1. **Validating**: the cart and payment details are checked against the
//!    catalog and the sale prices are frozen
//! 2. **AwaitingPayment**: the payment authorizer is called with no catalog
//!    lock held
//! 3. **Committing**: stock is reserved line by line in ascending product id
//!    order, the sale is appended to the ledger and the cart is cleared
//!
//! A failure while committing releases every reservation already made, in
//! reverse order, before the error is returned.

pub mod engine;
pub mod error;
pub mod payment;
pub mod state;

pub use engine::{CheckoutEngine, Receipt};
pub use error::{CheckoutError, CheckoutErrorKind};
pub use payment::{
    DEFAULT_PROCESSING_DELAY, InMemoryPaymentAuthorizer, PaymentAuthorizer, PaymentDetails,
    SimulatedPaymentGateway,
};
pub use state::{CheckoutState, RejectReason};
pub use tokio_util::sync::CancellationToken;
