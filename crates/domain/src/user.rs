//! User accounts and authentication.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// What a user is allowed to do in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Manages the catalog and reads reports.
    Admin,
    /// Restocks products.
    Supplier,
    /// Shops with a cart and checks out.
    Customer,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Supplier => "SUPPLIER",
            Role::Customer => "CUSTOMER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    /// Parses a role name case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "SUPPLIER" => Ok(Role::Supplier),
            "CUSTOMER" => Ok(Role::Customer),
            _ => Err(DomainError::UnknownRole(s.to_string())),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    username: String,
    password: String,
    role: Role,
}

impl User {
    /// Creates an account. Username and password must be non-empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(DomainError::InvalidAccount(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(DomainError::InvalidAccount(
                "password must not be empty".to_string(),
            ));
        }
        Ok(Self {
            username,
            password,
            role,
        })
    }

    /// Creates an account from a textual role name such as `"customer"`.
    pub fn with_role_name(
        role: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::new(username, password, role.parse()?)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns true if the credentials match this account.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Stored accounts, keyed by username.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding the store's built-in accounts.
    pub fn with_default_users() -> Self {
        let mut directory = Self::new();
        for (username, password, role) in [
            ("admin", "admin123", Role::Admin),
            ("supplier", "supplier123", Role::Supplier),
            ("customer", "customer123", Role::Customer),
            ("john_doe", "password", Role::Customer),
        ] {
            directory.users.insert(
                username.to_string(),
                User {
                    username: username.to_string(),
                    password: password.to_string(),
                    role,
                },
            );
        }
        directory
    }

    /// Adds an account. Usernames are unique.
    pub fn register(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(user.username()) {
            return Err(DomainError::DuplicateUser(user.username));
        }
        tracing::debug!(username = %user.username, role = %user.role, "user registered");
        self.users.insert(user.username.clone(), user);
        Ok(())
    }

    /// Looks up the account matching the credentials.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&User> {
        self.users
            .get(username)
            .filter(|user| user.verify(username, password))
            .ok_or(DomainError::InvalidCredentials)
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Returns all accounts sorted by username.
    pub fn users(&self) -> Vec<&User> {
        let mut users: Vec<_> = self.users.values().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Supplier".parse::<Role>().unwrap(), Role::Supplier);
        assert_eq!("CUSTOMER".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!(
            "cashier".parse::<Role>(),
            Err(DomainError::UnknownRole("cashier".to_string()))
        );
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::Supplier.to_string(), "SUPPLIER");
        assert_eq!(Role::Customer.to_string(), "CUSTOMER");
    }

    #[test]
    fn test_default_users_authenticate() {
        let directory = UserDirectory::with_default_users();
        assert_eq!(directory.len(), 4);

        let admin = directory.authenticate("admin", "admin123").unwrap();
        assert_eq!(admin.role(), Role::Admin);

        let john = directory.authenticate("john_doe", "password").unwrap();
        assert_eq!(john.role(), Role::Customer);
    }

    #[test]
    fn test_authenticate_rejects_bad_credentials() {
        let directory = UserDirectory::with_default_users();
        assert_eq!(
            directory.authenticate("admin", "wrong"),
            Err(DomainError::InvalidCredentials)
        );
        assert_eq!(
            directory.authenticate("nobody", "admin123"),
            Err(DomainError::InvalidCredentials)
        );
    }

    #[test]
    fn test_register() {
        let mut directory = UserDirectory::new();
        let user = User::with_role_name("customer", "alice", "s3cret").unwrap();
        directory.register(user.clone()).unwrap();

        assert_eq!(directory.authenticate("alice", "s3cret").unwrap(), &user);
        assert_eq!(
            directory.register(user),
            Err(DomainError::DuplicateUser("alice".to_string()))
        );
    }

    #[test]
    fn test_invalid_accounts() {
        assert!(User::new("", "pw", Role::Customer).is_err());
        assert!(User::new("bob", "", Role::Customer).is_err());
        assert!(User::with_role_name("manager", "bob", "pw").is_err());
    }

    #[test]
    fn test_users_sorted() {
        let directory = UserDirectory::with_default_users();
        let names: Vec<_> = directory.users().iter().map(|u| u.username()).collect();
        assert_eq!(names, vec!["admin", "customer", "john_doe", "supplier"]);
    }
}
