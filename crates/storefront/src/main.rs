//! Storefront entry point: runs a scripted day at the store.

use std::sync::Arc;

use checkout::PaymentDetails;
use common::{Money, ProductId};
use domain::{Role, Session, User};
use futures_util::future::join_all;
use storefront::{Config, StoreContext};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SHOPPERS: usize = 5;

fn card() -> PaymentDetails {
    PaymentDetails::new("4111111111111111", "12/27", "123")
}

/// A customer fills a cart and pays.
async fn customer_round(store: &StoreContext) -> storefront::Result<()> {
    let mut session = store.login("john_doe", "password")?;

    let cart = session.cart_mut()?;
    cart.add_item(ProductId::new(1), 3)?;
    cart.add_item(ProductId::new(3), 1)?;
    cart.add_item(ProductId::new(4), 2)?;

    println!("Cart for {}:", session.username());
    for line in session.cart()?.view(store.catalog()) {
        println!("  {line}");
    }
    println!("  Total: {}", session.cart()?.total_amount(store.catalog()).amount);

    let receipt = store.checkout(&mut session, &card()).await?;
    println!(
        "Payment successful! Transaction ID: {} ({})\n",
        receipt.transaction_id(),
        receipt.total_amount()
    );
    Ok(())
}

/// Several customers race for a product with a single unit left.
async fn contention_round(store: &Arc<StoreContext>, admin: &Session) -> storefront::Result<()> {
    let scarce = store
        .add_product(admin, "White Truffle", Money::from_cents(4999), 1, "Gourmet")?
        .id;

    let mut sessions = Vec::with_capacity(SHOPPERS);
    for i in 1..=SHOPPERS {
        let username = format!("shopper{i}");
        store.register_user(admin, User::new(username.as_str(), "shop", Role::Customer)?)?;
        let mut session = store.login(&username, "shop")?;
        session.cart_mut()?.add_item(scarce, 1)?;
        sessions.push(session);
    }

    let attempts = sessions.into_iter().map(|mut session| {
        let store = Arc::clone(store);
        tokio::spawn(async move {
            let outcome = store.checkout(&mut session, &card()).await;
            (session.username().to_string(), outcome)
        })
    });

    println!("{SHOPPERS} shoppers race for the last White Truffle:");
    for joined in join_all(attempts).await {
        match joined {
            Ok((username, Ok(receipt))) => {
                println!("  {username}: bought it ({})", receipt.transaction_id())
            }
            Ok((username, Err(e))) => println!("  {username}: {e}"),
            Err(e) => tracing::error!(error = %e, "checkout task failed"),
        }
    }
    println!();
    Ok(())
}

/// The supplier checks the watchlist and restocks.
fn supplier_round(store: &StoreContext) -> storefront::Result<()> {
    let supplier = store.login("supplier", "supplier123")?;

    println!("Supplier watchlist:");
    for line in store.supplier_watchlist(&supplier)? {
        println!("  {line}");
    }
    store.set_stock(&supplier, ProductId::new(10), 40)?;
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build the store
    let store = Arc::new(StoreContext::new(&config)?);
    let admin = store.login("admin", "admin123")?;

    // 4. Run the day
    customer_round(&store).await?;
    contention_round(&store, &admin).await?;
    supplier_round(&store)?;

    // 5. Close out
    println!("{}", store.inventory_report(&admin)?);
    println!("{}", store.sales_report(&admin)?);
    if config.print_metrics {
        println!("{}", metrics_handle.render());
    }

    tracing::info!(transactions = store.ledger().len(), "store closed");
    Ok(())
}
