//! Payment authorization trait, the simulated gateway and an in-memory
//! authorizer for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::{Money, TransactionId};

/// Processing time of the simulated gateway.
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(1000);

const MIN_CARD_NUMBER_LEN: usize = 13;

/// Card details entered at checkout.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl PaymentDetails {
    pub fn new(
        card_number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
        }
    }

    /// Returns the name of the first field that is empty or whitespace.
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("card number", &self.card_number),
            ("expiry", &self.expiry),
            ("cvv", &self.cvv),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

// Card data never reaches logs in full.
impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits: Vec<char> = self.card_number.chars().collect();
        let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        f.debug_struct("PaymentDetails")
            .field("card_number", &format_args!("****{last4}"))
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// Authorizes card payments and issues transaction ids.
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    /// Returns true if the charge is approved.
    ///
    /// May take a long time; callers must not hold catalog locks across it.
    async fn authorize(&self, amount: Money, card_number: &str, expiry: &str, cvv: &str) -> bool;

    /// Returns a transaction id not issued before by this authorizer.
    fn new_transaction_id(&self) -> TransactionId;
}

#[async_trait]
impl<T: PaymentAuthorizer + ?Sized> PaymentAuthorizer for Arc<T> {
    async fn authorize(&self, amount: Money, card_number: &str, expiry: &str, cvv: &str) -> bool {
        (**self).authorize(amount, card_number, expiry, cvv).await
    }

    fn new_transaction_id(&self) -> TransactionId {
        (**self).new_transaction_id()
    }
}

/// Stand-in for a card processor.
///
/// Waits for the processing delay, then approves any positive amount paid
/// with a card number of at least 13 characters and non-empty expiry and cvv.
#[derive(Debug)]
pub struct SimulatedPaymentGateway {
    delay: Duration,
    sequence: AtomicU64,
}

impl Default for SimulatedPaymentGateway {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSING_DELAY)
    }
}

impl SimulatedPaymentGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl PaymentAuthorizer for SimulatedPaymentGateway {
    #[tracing::instrument(skip(self, card_number, expiry, cvv))]
    async fn authorize(&self, amount: Money, card_number: &str, expiry: &str, cvv: &str) -> bool {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let approved = card_number.chars().count() >= MIN_CARD_NUMBER_LEN
            && !expiry.is_empty()
            && !cvv.is_empty()
            && amount.is_positive();
        tracing::debug!(approved, "payment processed");
        approved
    }

    /// `TXN<unix-millis>-<seq>`; the sequence keeps ids issued in the same
    /// millisecond apart.
    fn new_transaction_id(&self) -> TransactionId {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        TransactionId::new(format!("TXN{}-{:04}", Utc::now().timestamp_millis(), seq))
    }
}

#[derive(Debug, Default)]
struct InMemoryAuthorizerState {
    decline: bool,
    authorized: Vec<Money>,
    next_id: u32,
    fixed_transaction_id: Option<TransactionId>,
}

/// In-memory payment authorizer for testing.
///
/// Approves everything unless told to decline, and records every amount it
/// was asked to authorize.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentAuthorizer {
    state: Arc<Mutex<InMemoryAuthorizerState>>,
}

impl InMemoryPaymentAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the authorizer to decline every charge.
    pub fn set_decline(&self, decline: bool) {
        self.lock().decline = decline;
    }

    /// Makes `new_transaction_id` return the same id every time.
    pub fn set_fixed_transaction_id(&self, id: Option<TransactionId>) {
        self.lock().fixed_transaction_id = id;
    }

    /// Returns the number of authorization requests received.
    pub fn authorization_count(&self) -> usize {
        self.lock().authorized.len()
    }

    /// Returns the amounts requested, in call order.
    pub fn authorized_amounts(&self) -> Vec<Money> {
        self.lock().authorized.clone()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryAuthorizerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentAuthorizer for InMemoryPaymentAuthorizer {
    async fn authorize(&self, amount: Money, _card_number: &str, _expiry: &str, _cvv: &str) -> bool {
        let mut state = self.lock();
        state.authorized.push(amount);
        !state.decline
    }

    fn new_transaction_id(&self) -> TransactionId {
        let mut state = self.lock();
        if let Some(id) = &state.fixed_transaction_id {
            return id.clone();
        }
        state.next_id += 1;
        TransactionId::new(format!("TXN-{:04}", state.next_id))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const CARD: &str = "4111111111111111";

    #[tokio::test]
    async fn test_gateway_approves_valid_card() {
        let gateway = SimulatedPaymentGateway::new(Duration::ZERO);
        assert!(
            gateway
                .authorize(Money::from_cents(897), CARD, "12/27", "123")
                .await
        );
    }

    #[tokio::test]
    async fn test_gateway_declines() {
        let gateway = SimulatedPaymentGateway::new(Duration::ZERO);
        let amount = Money::from_cents(500);

        assert!(!gateway.authorize(amount, "411111111111", "12/27", "123").await);
        assert!(!gateway.authorize(amount, CARD, "", "123").await);
        assert!(!gateway.authorize(amount, CARD, "12/27", "").await);
        assert!(!gateway.authorize(Money::zero(), CARD, "12/27", "123").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_waits_for_processing_delay() {
        let gateway = SimulatedPaymentGateway::default();
        let started = tokio::time::Instant::now();

        gateway
            .authorize(Money::from_cents(100), CARD, "12/27", "123")
            .await;

        assert!(started.elapsed() >= DEFAULT_PROCESSING_DELAY);
    }

    #[test]
    fn test_gateway_transaction_ids_unique() {
        let gateway = SimulatedPaymentGateway::default();
        let ids: HashSet<String> = (0..100)
            .map(|_| gateway.new_transaction_id().to_string())
            .collect();

        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| id.starts_with("TXN")));
    }

    #[tokio::test]
    async fn test_in_memory_decline_and_recording() {
        let authorizer = InMemoryPaymentAuthorizer::new();
        assert!(authorizer.authorize(Money::from_cents(100), "", "", "").await);

        authorizer.set_decline(true);
        assert!(!authorizer.authorize(Money::from_cents(250), "", "", "").await);

        assert_eq!(authorizer.authorization_count(), 2);
        assert_eq!(
            authorizer.authorized_amounts(),
            vec![Money::from_cents(100), Money::from_cents(250)]
        );
    }

    #[test]
    fn test_in_memory_sequential_ids() {
        let authorizer = InMemoryPaymentAuthorizer::new();
        assert_eq!(authorizer.new_transaction_id().as_str(), "TXN-0001");
        assert_eq!(authorizer.new_transaction_id().as_str(), "TXN-0002");

        authorizer.set_fixed_transaction_id(Some(TransactionId::new("TXN-FIXED")));
        assert_eq!(authorizer.new_transaction_id().as_str(), "TXN-FIXED");
        assert_eq!(authorizer.new_transaction_id().as_str(), "TXN-FIXED");
    }

    #[test]
    fn test_blank_fields_and_masked_debug() {
        assert_eq!(PaymentDetails::new(CARD, "12/27", "123").first_blank_field(), None);
        assert_eq!(
            PaymentDetails::new(CARD, "  ", "").first_blank_field(),
            Some("expiry")
        );

        let rendered = format!("{:?}", PaymentDetails::new(CARD, "12/27", "123"));
        assert!(rendered.contains("****1111"));
        assert!(!rendered.contains(CARD));
        assert!(!rendered.contains("123\""));
    }
}
