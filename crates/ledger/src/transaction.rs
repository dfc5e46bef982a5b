use chrono::{DateTime, Utc};
use common::{CustomerId, Money, ProductId, TransactionId};
use serde::{Deserialize, Serialize};

/// One sold product, priced as it was at the time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl TransactionLine {
    /// Returns `unit_price × quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A completed sale.
///
/// Lines are a snapshot: later edits to the products do not change a
/// recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub customer_id: CustomerId,
    pub total_amount: Money,
    pub timestamp: DateTime<Utc>,
    pub lines: Vec<TransactionLine>,
}

impl Transaction {
    /// Creates a transaction stamped with the current time. The total is
    /// derived from the lines.
    pub fn new(
        transaction_id: TransactionId,
        customer_id: CustomerId,
        lines: Vec<TransactionLine>,
    ) -> Self {
        Self::at(transaction_id, customer_id, lines, Utc::now())
    }

    /// Creates a transaction with an explicit timestamp.
    pub fn at(
        transaction_id: TransactionId,
        customer_id: CustomerId,
        lines: Vec<TransactionLine>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let total_amount = lines.iter().map(TransactionLine::line_total).sum();
        Self {
            transaction_id,
            customer_id,
            total_amount,
            timestamp,
            lines,
        }
    }

    /// Total number of units sold.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}
