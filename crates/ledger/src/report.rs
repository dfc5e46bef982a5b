//! Plain-text inventory and sales reports.

use std::fmt::Write;

use catalog::ProductCatalog;
use chrono::{DateTime, Utc};
use common::Money;

use crate::ledger::TransactionLedger;
use crate::transaction::Transaction;

/// Products at or below this many units are flagged in the inventory report.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TRANSACTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const RULE_WIDTH: usize = 65;

/// Renders read-only reports from the catalog and ledger.
///
/// Reports only read current state; they never mutate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportGenerator {
    low_stock_threshold: u32,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_STOCK_THRESHOLD)
    }
}

impl ReportGenerator {
    pub fn new(low_stock_threshold: u32) -> Self {
        Self {
            low_stock_threshold,
        }
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    /// Renders the inventory report stamped with the current time.
    pub fn generate_inventory_report(&self, catalog: &ProductCatalog) -> String {
        self.generate_inventory_report_at(catalog, Utc::now())
    }

    /// Renders the inventory report with an explicit generation time.
    #[tracing::instrument(skip(self, catalog))]
    pub fn generate_inventory_report_at(
        &self,
        catalog: &ProductCatalog,
        generated_at: DateTime<Utc>,
    ) -> String {
        let products = catalog.list_products();
        let low_stock: Vec<_> = products
            .iter()
            .filter(|p| p.stock_quantity <= self.low_stock_threshold)
            .collect();

        let mut report = String::new();
        report.push_str("=== INVENTORY REPORT ===\n");
        let _ = writeln!(report, "Generated: {}\n", generated_at.format(GENERATED_FORMAT));
        let _ = writeln!(report, "Total Products: {}\n", products.len());

        let _ = writeln!(
            report,
            "{:<5} {:<20} {:<10} {:<10} {:<15}",
            "ID", "Name", "Price", "Quantity", "Category"
        );
        report.push_str(&"=".repeat(RULE_WIDTH));
        report.push('\n');

        for product in &products {
            let _ = writeln!(
                report,
                "{:<5} {:<20} ${:<9} {:<10} {:<15}",
                product.id.as_u64(),
                product.name,
                plain_amount(product.unit_price),
                product.stock_quantity,
                product.category
            );
        }

        if !low_stock.is_empty() {
            report.push_str("\n=== LOW STOCK ALERT ===\n");
            for product in low_stock {
                let _ = writeln!(
                    report,
                    "⚠️  {}: {} remaining",
                    product.name, product.stock_quantity
                );
            }
        }

        tracing::debug!(products = products.len(), "inventory report generated");
        report
    }

    /// Renders the sales report stamped with the current time.
    pub fn generate_sales_report(&self, ledger: &TransactionLedger) -> String {
        self.generate_sales_report_at(ledger, Utc::now())
    }

    /// Renders the sales report with an explicit generation time.
    #[tracing::instrument(skip(self, ledger))]
    pub fn generate_sales_report_at(
        &self,
        ledger: &TransactionLedger,
        generated_at: DateTime<Utc>,
    ) -> String {
        let transactions = ledger.all_transactions();

        let mut report = String::new();
        report.push_str("=== SALES REPORT ===\n");
        let _ = writeln!(report, "Generated: {}\n", generated_at.format(GENERATED_FORMAT));

        if transactions.is_empty() {
            report.push_str("No transactions recorded.\n");
            return report;
        }

        report.push_str("Recent Transactions:\n");
        for transaction in &transactions {
            report.push_str(&summary_line(transaction));
            report.push('\n');
        }
        let revenue: Money = transactions.iter().map(|t| t.total_amount).sum();
        let _ = writeln!(report, "\nTotal Revenue: {revenue}");

        report
    }
}

/// One-line summary of a transaction as shown in the sales report.
pub fn summary_line(transaction: &Transaction) -> String {
    format!(
        "Transaction {} - Customer: {} - Amount: {} - Date: {}",
        transaction.transaction_id,
        transaction.customer_id,
        transaction.total_amount,
        transaction.timestamp.format(TRANSACTION_DATE_FORMAT)
    )
}

// Money without the currency sign, for the fixed-width price column.
fn plain_amount(amount: Money) -> String {
    let rendered = amount.to_string();
    rendered.replacen('$', "", 1)
}
