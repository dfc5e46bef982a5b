//! Customer-facing domain for the grocery store core.
//!
//! This crate provides:
//! - [`Cart`], the per-customer staging area for a purchase
//! - [`User`] accounts with a tagged [`Role`] and the [`UserDirectory`]
//!   they are authenticated against
//! - [`Session`], the scope of one logged-in user; only customer sessions
//!   own a cart

pub mod cart;
pub mod error;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine, CartLineView, CartTotal};
pub use error::{DomainError, Result};
pub use session::Session;
pub use user::{Role, User, UserDirectory};
