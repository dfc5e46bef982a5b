//! The checkout engine.

use std::time::Instant;

use catalog::ProductCatalog;
use chrono::{DateTime, Utc};
use common::{CheckoutId, CustomerId, Money, TransactionId};
use domain::Cart;
use ledger::{Transaction, TransactionLedger, TransactionLine};
use tokio_util::sync::CancellationToken;

use crate::error::{CheckoutError, CheckoutErrorKind};
use crate::payment::{PaymentAuthorizer, PaymentDetails};
use crate::state::CheckoutState;

/// Proof of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    checkout_id: CheckoutId,
    transaction: Transaction,
    trail: Vec<CheckoutState>,
}

impl Receipt {
    pub fn checkout_id(&self) -> CheckoutId {
        self.checkout_id
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction.transaction_id
    }

    pub fn total_amount(&self) -> Money {
        self.transaction.total_amount
    }

    pub fn lines(&self) -> &[TransactionLine] {
        &self.transaction.lines
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.transaction.timestamp
    }

    /// The recorded transaction, as stored in the ledger.
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// States visited, from `Idle` to `Completed`.
    pub fn trail(&self) -> &[CheckoutState] {
        &self.trail
    }
}

/// States visited by one attempt.
struct Trail {
    states: Vec<CheckoutState>,
}

impl Trail {
    fn new() -> Self {
        Self {
            states: vec![CheckoutState::Idle],
        }
    }

    fn current(&self) -> CheckoutState {
        self.states
            .last()
            .copied()
            .unwrap_or(CheckoutState::Idle)
    }

    fn enter(&mut self, next: CheckoutState) {
        let current = self.current();
        debug_assert!(
            current.can_transition_to(next),
            "illegal checkout transition {current} -> {next}"
        );
        tracing::debug!(from = %current, to = %next, "checkout state changed");
        self.states.push(next);
    }

    /// Returns true if `cancel` fired and the current state still honors it.
    fn cancel_requested(&self, cancel: &CancellationToken) -> bool {
        self.current().can_cancel() && cancel.is_cancelled()
    }

    fn into_states(self) -> Vec<CheckoutState> {
        self.states
    }
}

/// Turns a customer's cart into a recorded sale.
///
/// The engine holds handles to the shared catalog and ledger. Many checkouts
/// may run at once; the catalog's per-product locking keeps stock exact.
#[derive(Debug, Clone)]
pub struct CheckoutEngine<P: PaymentAuthorizer> {
    catalog: ProductCatalog,
    ledger: TransactionLedger,
    payment: P,
}

impl<P: PaymentAuthorizer> CheckoutEngine<P> {
    pub fn new(catalog: ProductCatalog, ledger: TransactionLedger, payment: P) -> Self {
        Self {
            catalog,
            ledger,
            payment,
        }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn payment(&self) -> &P {
        &self.payment
    }

    /// Checks out `cart` for `customer_id`.
    ///
    /// On success the stock is decremented, the sale is in the ledger and the
    /// cart is empty. On failure the catalog, ledger and cart are as they were.
    pub async fn checkout(
        &self,
        customer_id: &CustomerId,
        cart: &mut Cart,
        details: &PaymentDetails,
    ) -> Result<Receipt, CheckoutError> {
        self.checkout_with_cancel(customer_id, cart, details, &CancellationToken::new())
            .await
    }

    /// Like [`checkout`](Self::checkout), but aborts with `Cancelled` if the
    /// token fires while validating or waiting on payment.
    ///
    /// Once committing starts the token is no longer consulted, and the rest
    /// of the checkout runs without yielding, so dropping the future cannot
    /// interrupt it either.
    pub async fn checkout_with_cancel(
        &self,
        customer_id: &CustomerId,
        cart: &mut Cart,
        details: &PaymentDetails,
        cancel: &CancellationToken,
    ) -> Result<Receipt, CheckoutError> {
        let checkout_id = CheckoutId::new();
        let started = Instant::now();
        metrics::counter!("checkout_attempts_total").increment(1);

        let mut trail = Trail::new();
        let result = self
            .run(checkout_id, &mut trail, customer_id, cart, details, cancel)
            .await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(transaction) => {
                trail.enter(CheckoutState::Completed);
                metrics::counter!("checkout_completed_total").increment(1);
                tracing::info!(
                    %checkout_id,
                    transaction_id = %transaction.transaction_id,
                    total = %transaction.total_amount,
                    "checkout completed"
                );
                Ok(Receipt {
                    checkout_id,
                    transaction,
                    trail: trail.into_states(),
                })
            }
            Err(kind) => {
                let reason = kind.reason();
                let failed_in = trail.current();
                trail.enter(CheckoutState::Rejected(reason));
                metrics::counter!("checkout_rejected_total", "reason" => reason.as_str())
                    .increment(1);
                tracing::warn!(%checkout_id, %failed_in, error = %kind, "checkout rejected");
                Err(CheckoutError::new(checkout_id, kind, trail.into_states()))
            }
        }
    }

    #[tracing::instrument(
        skip_all,
        fields(checkout_id = %checkout_id, customer_id = %customer_id)
    )]
    async fn run(
        &self,
        checkout_id: CheckoutId,
        trail: &mut Trail,
        customer_id: &CustomerId,
        cart: &mut Cart,
        details: &PaymentDetails,
        cancel: &CancellationToken,
    ) -> Result<Transaction, CheckoutErrorKind> {
        trail.enter(CheckoutState::Validating);
        if trail.cancel_requested(cancel) {
            return Err(CheckoutErrorKind::Cancelled);
        }
        let lines = self.validate(cart, details)?;
        let total = order_total(&lines)?;

        trail.enter(CheckoutState::AwaitingPayment);
        let cancellable = trail.current().can_cancel();
        let approved = tokio::select! {
            biased;
            _ = cancel.cancelled(), if cancellable => return Err(CheckoutErrorKind::Cancelled),
            approved = self.payment.authorize(
                total,
                &details.card_number,
                &details.expiry,
                &details.cvv,
            ) => approved,
        };
        if !approved {
            return Err(CheckoutErrorKind::PaymentDeclined);
        }

        // No await points past here.
        trail.enter(CheckoutState::Committing);
        let transaction = self.commit(customer_id, lines)?;
        cart.clear();
        Ok(transaction)
    }

    /// Confirms every line is in stock and freezes names and prices.
    fn validate(
        &self,
        cart: &Cart,
        details: &PaymentDetails,
    ) -> Result<Vec<TransactionLine>, CheckoutErrorKind> {
        if cart.is_empty() {
            return Err(CheckoutErrorKind::InvalidInput("cart is empty".to_string()));
        }
        if let Some(field) = details.first_blank_field() {
            return Err(CheckoutErrorKind::InvalidInput(format!(
                "{field} must not be blank"
            )));
        }

        cart.lines()
            .into_iter()
            .map(|line| {
                let product = self.catalog.get_product(line.product_id)?;
                if product.stock_quantity < line.quantity {
                    return Err(CheckoutErrorKind::InsufficientStock {
                        product_id: line.product_id,
                        requested: line.quantity,
                        available: product.stock_quantity,
                    });
                }
                Ok(TransactionLine {
                    product_id: product.id,
                    product_name: product.name,
                    quantity: line.quantity,
                    unit_price: product.unit_price,
                })
            })
            .collect()
    }

    /// Reserves every line in ascending product id order and records the
    /// sale. Any failure restores what was already reserved.
    fn commit(
        &self,
        customer_id: &CustomerId,
        lines: Vec<TransactionLine>,
    ) -> Result<Transaction, CheckoutErrorKind> {
        debug_assert!(lines.is_sorted_by_key(|l| l.product_id));

        for (reserved, line) in lines.iter().enumerate() {
            match self
                .catalog
                .try_reserve_and_decrement(line.product_id, line.quantity)
            {
                Ok(remaining) => {
                    tracing::debug!(product_id = %line.product_id, remaining, "stock reserved");
                }
                Err(e) => {
                    self.roll_back(&lines[..reserved]);
                    return Err(e.into());
                }
            }
        }

        let transaction = Transaction::new(
            self.payment.new_transaction_id(),
            customer_id.clone(),
            lines,
        );
        if let Err(e) = self.ledger.record(transaction.clone()) {
            self.roll_back(&transaction.lines);
            return Err(e.into());
        }
        Ok(transaction)
    }

    /// Returns reserved units to stock, last reservation first.
    fn roll_back(&self, reserved: &[TransactionLine]) {
        if reserved.is_empty() {
            return;
        }
        metrics::counter!("checkout_rollbacks_total").increment(1);
        for line in reserved.iter().rev() {
            match self.catalog.increase_stock(line.product_id, line.quantity) {
                Ok(stock) => {
                    tracing::warn!(
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        stock,
                        "reservation rolled back"
                    );
                }
                // Deleted since it was reserved; nothing left to restore.
                Err(e) => {
                    tracing::error!(product_id = %line.product_id, error = %e, "rollback skipped");
                }
            }
        }
    }
}

/// Sums the line totals, rejecting orders whose total does not fit in cents.
fn order_total(lines: &[TransactionLine]) -> Result<Money, CheckoutErrorKind> {
    lines
        .iter()
        .try_fold(Money::zero(), |total, line| {
            line.unit_price
                .checked_multiply(line.quantity)
                .and_then(|line_total| total.checked_add(line_total))
        })
        .ok_or_else(|| CheckoutErrorKind::InvalidInput("order total is too large".to_string()))
}

#[cfg(test)]
mod tests {
    use common::ProductId;

    use super::*;

    fn line(id: u64, quantity: u32, unit_price: Money) -> TransactionLine {
        TransactionLine {
            product_id: ProductId::new(id),
            product_name: format!("Product {id}"),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_order_total() {
        let lines = vec![
            line(1, 3, Money::from_cents(299)),
            line(3, 2, Money::from_cents(399)),
        ];
        assert_eq!(order_total(&lines).unwrap(), Money::from_cents(1695));
        assert_eq!(order_total(&[]).unwrap(), Money::zero());
    }

    #[test]
    fn test_order_total_overflow_is_invalid_input() {
        let huge = Money::from_cents(i64::MAX / 2 + 1);
        let err = order_total(&[line(1, 2, huge)]).unwrap_err();
        assert!(matches!(err, CheckoutErrorKind::InvalidInput(_)));

        let err = order_total(&[line(1, 1, huge), line(2, 1, huge)]).unwrap_err();
        assert!(matches!(err, CheckoutErrorKind::InvalidInput(_)));
    }

    #[test]
    fn test_cancel_honored_only_before_commit() {
        let cancel = CancellationToken::new();
        let mut trail = Trail::new();
        trail.enter(CheckoutState::Validating);
        assert!(!trail.cancel_requested(&cancel));

        cancel.cancel();
        assert!(trail.cancel_requested(&cancel));
        trail.enter(CheckoutState::AwaitingPayment);
        assert!(trail.cancel_requested(&cancel));

        trail.enter(CheckoutState::Committing);
        assert!(!trail.cancel_requested(&cancel));
    }
}
