//! Product record and partial updates.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// A product as stored in the catalog.
///
/// Values handed out by the catalog are snapshots; mutating them has no
/// effect on stored state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub stock_quantity: u32,
    pub category: String,
}

impl Product {
    /// Returns true if at least one unit is in stock.
    pub fn is_available(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// A partial overwrite of a product's mutable fields.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub unit_price: Option<Money>,
    pub stock_quantity: Option<u32>,
    pub category: Option<String>,
}

impl ProductUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unit_price(mut self, price: Money) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn stock_quantity(mut self, quantity: u32) -> Self {
        self.stock_quantity = Some(quantity);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns true if no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit_price.is_none()
            && self.stock_quantity.is_none()
            && self.category.is_none()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_label("name", name)?;
        }
        if let Some(price) = self.unit_price {
            validate_price(price)?;
        }
        if let Some(category) = &self.category {
            validate_label("category", category)?;
        }
        Ok(())
    }

    pub(crate) fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.unit_price {
            product.unit_price = price;
        }
        if let Some(quantity) = self.stock_quantity {
            product.stock_quantity = quantity;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
    }
}

pub(crate) fn validate_label(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::InvalidInput(format!(
            "product {field} must not be empty"
        )));
    }
    Ok(())
}

/// Highest unit price the catalog accepts: $1,000,000.00.
///
/// Keeps `price × u32::MAX` well inside `i64` cents for any single line.
pub const MAX_UNIT_PRICE: Money = Money::from_cents(100_000_000);

pub(crate) fn validate_price(price: Money) -> Result<()> {
    if price.is_negative() {
        return Err(CatalogError::InvalidInput(format!(
            "unit price {price} must not be negative"
        )));
    }
    if price > MAX_UNIT_PRICE {
        return Err(CatalogError::InvalidInput(format!(
            "unit price {price} exceeds the maximum of {MAX_UNIT_PRICE}"
        )));
    }
    Ok(())
}
