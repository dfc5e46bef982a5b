//! Append-only record of completed sales.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::{CustomerId, Money, TransactionId};

use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

#[derive(Debug, Default)]
struct LedgerState {
    transactions: Vec<Transaction>,
    ids: HashSet<TransactionId>,
}

/// Thread-safe, append-only transaction ledger.
///
/// Transactions are kept in append order and are never modified or removed.
/// Cloning yields another handle to the same ledger.
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl TransactionLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed transaction.
    ///
    /// Fails with `DuplicateTransaction` if the id was already recorded; the
    /// ledger is unchanged in that case.
    #[tracing::instrument(skip(self, transaction), fields(transaction_id = %transaction.transaction_id))]
    pub fn record(&self, transaction: Transaction) -> Result<()> {
        let mut state = self.write_state();
        if !state.ids.insert(transaction.transaction_id.clone()) {
            tracing::warn!("duplicate transaction id rejected");
            return Err(LedgerError::DuplicateTransaction(
                transaction.transaction_id,
            ));
        }

        tracing::info!(
            customer_id = %transaction.customer_id,
            total = %transaction.total_amount,
            lines = transaction.lines.len(),
            "transaction recorded"
        );
        state.transactions.push(transaction);
        metrics::counter!("ledger_transactions_total").increment(1);
        Ok(())
    }

    /// Returns a snapshot of every transaction in append order.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.read_state().transactions.clone()
    }

    /// Looks up a transaction by id.
    pub fn get(&self, id: &TransactionId) -> Result<Transaction> {
        self.read_state()
            .transactions
            .iter()
            .find(|t| &t.transaction_id == id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    /// Returns the transactions of one customer in append order.
    pub fn transactions_for(&self, customer_id: &CustomerId) -> Vec<Transaction> {
        self.read_state()
            .transactions
            .iter()
            .filter(|t| &t.customer_id == customer_id)
            .cloned()
            .collect()
    }

    /// Sum of all recorded totals.
    pub fn total_revenue(&self) -> Money {
        self.read_state()
            .transactions
            .iter()
            .map(|t| t.total_amount)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.read_state().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exports the ledger as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        let state = self.read_state();
        Ok(serde_json::to_string_pretty(&state.transactions)?)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
