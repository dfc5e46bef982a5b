//! Shopping cart.

use std::collections::BTreeMap;

use catalog::ProductCatalog;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// One product the customer intends to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A cart total computed from live catalog prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotal {
    /// Sum of `unit_price × quantity` over lines whose product still exists.
    pub amount: Money,
    /// Products in the cart that are no longer in the catalog. They are left
    /// out of `amount`; the caller decides whether to drop them.
    pub missing: Vec<ProductId>,
}

impl CartTotal {
    /// Returns true if every cart line was priced.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// A cart line joined with the product's current name and price, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

impl std::fmt::Display for CartLineView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x{} - {}", self.name, self.quantity, self.line_total)
    }
}

/// A customer's staged purchase.
///
/// The cart never touches stock; it only reads prices for display. Stock is
/// validated and reserved at checkout, so a cart can hold more units than
/// are currently available.
///
/// Lines are kept ordered by product id, which is also the order checkout
/// commits them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<ProductId, CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of a product, merging into an existing line.
    pub fn add_item(&mut self, product_id: ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity {
                product_id,
                quantity: 0,
            });
        }

        match self.lines.get_mut(&product_id) {
            Some(line) => {
                let merged = u64::from(line.quantity) + u64::from(quantity);
                line.quantity = u32::try_from(merged).map_err(|_| DomainError::InvalidQuantity {
                    product_id,
                    quantity: merged,
                })?;
            }
            None => {
                self.lines.insert(
                    product_id,
                    CartLine {
                        product_id,
                        quantity,
                    },
                );
            }
        }

        tracing::trace!(%product_id, quantity, "item added to cart");
        Ok(())
    }

    /// Removes a product's line. Returns the removed line, if any.
    pub fn remove_item(&mut self, product_id: ProductId) -> Option<CartLine> {
        self.lines.remove(&product_id)
    }

    /// Sets a line's quantity; zero removes the line.
    ///
    /// Products not in the cart are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.lines.remove(&product_id);
        } else if let Some(line) = self.lines.get_mut(&product_id) {
            line.quantity = quantity;
        }
    }

    /// Returns the lines in ascending product id order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.values().copied().collect()
    }

    /// Returns the quantity staged for a product.
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines.get(&product_id).map(|line| line.quantity)
    }

    /// Number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Computes the total from current catalog prices.
    ///
    /// Lines whose product has been deleted are skipped and listed in
    /// [`CartTotal::missing`].
    pub fn total_amount(&self, catalog: &ProductCatalog) -> CartTotal {
        let mut amount = Money::zero();
        let mut missing = Vec::new();

        for line in self.lines.values() {
            match catalog.get_product(line.product_id) {
                Ok(product) => amount += product.unit_price.multiply(line.quantity),
                Err(_) => missing.push(line.product_id),
            }
        }

        CartTotal { amount, missing }
    }

    /// Joins each line with its product for display, skipping deleted products.
    pub fn view(&self, catalog: &ProductCatalog) -> Vec<CartLineView> {
        self.lines
            .values()
            .filter_map(|line| {
                let product = catalog.get_product(line.product_id).ok()?;
                Some(CartLineView {
                    product_id: line.product_id,
                    name: product.name,
                    quantity: line.quantity,
                    unit_price: product.unit_price,
                    line_total: product.unit_price.multiply(line.quantity),
                })
            })
            .collect()
    }
}
