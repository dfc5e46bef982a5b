//! Process context for the grocery store.
//!
//! [`StoreContext`] owns the single catalog and ledger of the process and
//! hands out role-gated operations to logged-in sessions.

pub mod config;
pub mod error;

use std::sync::{Arc, PoisonError, RwLock};

use catalog::{Product, ProductCatalog, ProductUpdate};
use checkout::{
    CancellationToken, CheckoutEngine, PaymentAuthorizer, PaymentDetails, Receipt,
    SimulatedPaymentGateway,
};
use common::{Money, ProductId};
use domain::{Role, Session, User, UserDirectory};
use ledger::{ReportGenerator, TransactionLedger};

pub use config::Config;
pub use error::{AppError, Result};

/// Products at or below this many units show on the supplier's watchlist.
pub const SUPPLIER_WATCH_THRESHOLD: u32 = 15;

/// Shared state of a running store.
pub struct StoreContext {
    catalog: ProductCatalog,
    ledger: TransactionLedger,
    users: RwLock<UserDirectory>,
    reports: ReportGenerator,
    engine: CheckoutEngine<Arc<dyn PaymentAuthorizer>>,
}

impl StoreContext {
    /// Builds the store with the simulated payment gateway.
    pub fn new(config: &Config) -> Result<Self> {
        let gateway = SimulatedPaymentGateway::new(config.payment_delay);
        Self::with_authorizer(config, Arc::new(gateway))
    }

    /// Builds the store around a caller-supplied payment authorizer.
    pub fn with_authorizer(config: &Config, payment: Arc<dyn PaymentAuthorizer>) -> Result<Self> {
        let catalog = if config.seed_catalog {
            ProductCatalog::with_default_products()?
        } else {
            ProductCatalog::new()
        };
        let ledger = TransactionLedger::new();
        let engine = CheckoutEngine::new(catalog.clone(), ledger.clone(), payment);

        tracing::info!(
            products = catalog.len(),
            low_stock_threshold = config.low_stock_threshold,
            "store context ready"
        );
        Ok(Self {
            catalog,
            ledger,
            users: RwLock::new(UserDirectory::with_default_users()),
            reports: ReportGenerator::new(config.low_stock_threshold),
            engine,
        })
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Authenticates a user and opens a session for them.
    #[tracing::instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let session = Session::start(users.authenticate(username, password)?);
        metrics::counter!("store_logins_total", "role" => session.role().as_str()).increment(1);
        tracing::info!(role = %session.role(), "logged in");
        Ok(session)
    }

    /// Products a customer can currently buy.
    pub fn browse(&self) -> Vec<Product> {
        self.catalog.list_available()
    }

    pub fn register_user(&self, session: &Session, user: User) -> Result<()> {
        require(session, &[Role::Admin], "register users")?;
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(user)?;
        Ok(())
    }

    /// One `"name (ROLE)"` line per account, sorted by name.
    pub fn user_listing(&self, session: &Session) -> Result<Vec<String>> {
        require(session, &[Role::Admin], "list users")?;
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .users()
            .into_iter()
            .map(|user| format!("{} ({})", user.username(), user.role()))
            .collect())
    }

    pub fn add_product(
        &self,
        session: &Session,
        name: &str,
        unit_price: Money,
        stock_quantity: u32,
        category: &str,
    ) -> Result<Product> {
        require(session, &[Role::Admin], "add products")?;
        Ok(self
            .catalog
            .add_product(name, unit_price, stock_quantity, category)?)
    }

    pub fn update_product(
        &self,
        session: &Session,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product> {
        require(session, &[Role::Admin], "edit products")?;
        Ok(self.catalog.update_product(id, update)?)
    }

    pub fn delete_product(&self, session: &Session, id: ProductId) -> Result<Product> {
        require(session, &[Role::Admin], "delete products")?;
        Ok(self.catalog.delete_product(id)?)
    }

    /// Sets a product's stock to an absolute level.
    pub fn set_stock(&self, session: &Session, id: ProductId, quantity: u32) -> Result<()> {
        require(session, &[Role::Admin, Role::Supplier], "update stock")?;
        self.catalog.restock(id, quantity)?;
        tracing::info!(product_id = %id, quantity, by = session.username(), "stock updated");
        Ok(())
    }

    /// Products running low, as `"<name> - Current Stock: N"` lines.
    pub fn supplier_watchlist(&self, session: &Session) -> Result<Vec<String>> {
        require(session, &[Role::Admin, Role::Supplier], "view the watchlist")?;
        Ok(self
            .catalog
            .list_low_stock(SUPPLIER_WATCH_THRESHOLD)
            .into_iter()
            .map(|p| format!("{} - Current Stock: {}", p.name, p.stock_quantity))
            .collect())
    }

    pub fn inventory_report(&self, session: &Session) -> Result<String> {
        require(session, &[Role::Admin], "view reports")?;
        Ok(self.reports.generate_inventory_report(&self.catalog))
    }

    pub fn sales_report(&self, session: &Session) -> Result<String> {
        require(session, &[Role::Admin], "view reports")?;
        Ok(self.reports.generate_sales_report(&self.ledger))
    }

    /// Checks out the session's cart.
    pub async fn checkout(&self, session: &mut Session, details: &PaymentDetails) -> Result<Receipt> {
        self.checkout_with_cancel(session, details, &CancellationToken::new())
            .await
    }

    pub async fn checkout_with_cancel(
        &self,
        session: &mut Session,
        details: &PaymentDetails,
        cancel: &CancellationToken,
    ) -> Result<Receipt> {
        let (customer_id, cart) = session.customer_mut()?;
        Ok(self
            .engine
            .checkout_with_cancel(customer_id, cart, details, cancel)
            .await?)
    }
}

fn require(session: &Session, allowed: &[Role], action: &'static str) -> Result<()> {
    let role = session.role();
    if allowed.contains(&role) {
        return Ok(());
    }
    tracing::warn!(username = session.username(), %role, action, "permission denied");
    Err(AppError::PermissionDenied {
        username: session.username().to_string(),
        role,
        action,
    })
}
