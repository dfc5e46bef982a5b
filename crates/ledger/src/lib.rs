//! Sales ledger and reports for the grocery store core.
//!
//! - [`TransactionLedger`]: append-only record of completed sales
//! - [`Transaction`]: a sale with prices frozen at the moment it was made
//! - [`ReportGenerator`]: textual inventory and sales summaries

pub mod error;
pub mod ledger;
pub mod report;
pub mod transaction;

pub use error::{LedgerError, Result};
pub use ledger::TransactionLedger;
pub use report::{DEFAULT_LOW_STOCK_THRESHOLD, ReportGenerator, summary_line};
pub use transaction::{Transaction, TransactionLine};
