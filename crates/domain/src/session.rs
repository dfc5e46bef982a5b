//! Logged-in user sessions.

use common::CustomerId;

use crate::cart::Cart;
use crate::error::{DomainError, Result};
use crate::user::{Role, User};

/// The interaction scope of one authenticated user.
///
/// Only customers shop, so only the customer variant carries a cart. The
/// cart is private to the session and needs no synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Admin { username: String },
    Supplier { username: String },
    Customer { customer_id: CustomerId, cart: Cart },
}

impl Session {
    /// Starts a session for an authenticated user.
    pub fn start(user: &User) -> Self {
        let username = user.username().to_string();
        match user.role() {
            Role::Admin => Session::Admin { username },
            Role::Supplier => Session::Supplier { username },
            Role::Customer => Session::Customer {
                customer_id: CustomerId::new(username),
                cart: Cart::new(),
            },
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Session::Admin { username } | Session::Supplier { username } => username,
            Session::Customer { customer_id, .. } => customer_id.as_str(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Session::Admin { .. } => Role::Admin,
            Session::Supplier { .. } => Role::Supplier,
            Session::Customer { .. } => Role::Customer,
        }
    }

    /// Returns the customer id and cart, or `NotACustomer`.
    pub fn customer_mut(&mut self) -> Result<(&CustomerId, &mut Cart)> {
        match self {
            Session::Customer { customer_id, cart } => Ok((&*customer_id, cart)),
            other => Err(DomainError::NotACustomer(other.username().to_string())),
        }
    }

    /// Returns the session's cart, or `NotACustomer`.
    pub fn cart(&self) -> Result<&Cart> {
        match self {
            Session::Customer { cart, .. } => Ok(cart),
            other => Err(DomainError::NotACustomer(other.username().to_string())),
        }
    }

    /// Returns the session's cart mutably, or `NotACustomer`.
    pub fn cart_mut(&mut self) -> Result<&mut Cart> {
        self.customer_mut().map(|(_, cart)| cart)
    }
}

#[cfg(test)]
mod tests {
    use common::ProductId;

    use super::*;
    use crate::user::UserDirectory;

    #[test]
    fn test_customer_session_owns_a_cart() {
        let directory = UserDirectory::with_default_users();
        let user = directory.authenticate("customer", "customer123").unwrap();
        let mut session = Session::start(user);

        assert_eq!(session.role(), Role::Customer);
        session
            .cart_mut()
            .unwrap()
            .add_item(ProductId::new(1), 2)
            .unwrap();

        let (customer_id, cart) = session.customer_mut().unwrap();
        assert_eq!(customer_id.as_str(), "customer");
        assert_eq!(cart.quantity_of(ProductId::new(1)), Some(2));
    }

    #[test]
    fn test_staff_sessions_have_no_cart() {
        let directory = UserDirectory::with_default_users();

        let admin = Session::start(directory.authenticate("admin", "admin123").unwrap());
        assert_eq!(admin.username(), "admin");
        assert_eq!(
            admin.cart(),
            Err(DomainError::NotACustomer("admin".to_string()))
        );

        let mut supplier =
            Session::start(directory.authenticate("supplier", "supplier123").unwrap());
        assert_eq!(supplier.role(), Role::Supplier);
        assert!(supplier.cart_mut().is_err());
    }
}
