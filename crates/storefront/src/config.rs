//! Application configuration loaded from environment variables.

use std::time::Duration;

use checkout::DEFAULT_PROCESSING_DELAY;
use ledger::DEFAULT_LOW_STOCK_THRESHOLD;

/// Store configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `LOW_STOCK_THRESHOLD`: inventory report alert level (default: `10`)
/// - `PAYMENT_DELAY_MS`: simulated gateway processing time (default: `1000`)
/// - `SEED_CATALOG`: stock the opening inventory at start (default: `true`)
/// - `PRINT_METRICS`: print the Prometheus snapshot on exit (default: `false`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub low_stock_threshold: u32,
    pub payment_delay: Duration,
    pub seed_catalog: bool,
    pub print_metrics: bool,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            low_stock_threshold: lookup("LOW_STOCK_THRESHOLD")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.low_stock_threshold),
            payment_delay: lookup("PAYMENT_DELAY_MS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.payment_delay),
            seed_catalog: lookup("SEED_CATALOG")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.seed_catalog),
            print_metrics: lookup("PRINT_METRICS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.print_metrics),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            payment_delay: DEFAULT_PROCESSING_DELAY,
            seed_catalog: true,
            print_metrics: false,
            log_level: "info".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
