//! Shared types for the grocery store core.
//!
//! Identifiers and the [`Money`] value type used by the catalog, cart,
//! ledger and checkout crates.

pub mod ids;
pub mod money;

pub use ids::{CheckoutId, CustomerId, ProductId, TransactionId};
pub use money::{Money, ParseMoneyError};
