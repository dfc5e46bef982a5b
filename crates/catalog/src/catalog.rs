//! The product catalog and its locking discipline.
//!
//! Layout:
//! ```text
//! RwLock<CatalogState>
//!   ├── next_id
//!   └── products: BTreeMap<ProductId, Arc<Mutex<Slot>>>
//! ```
//! The outer lock only guards the id → slot map (add/delete/lookup). Every
//! read or write of a product's fields, stock included, happens under that
//! product's own mutex. The outer guard is always released before a slot
//! mutex is taken, so the two never nest.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::{Money, ProductId};

use crate::error::{CatalogError, Result};
use crate::product::{Product, ProductUpdate, validate_label, validate_price};
use crate::seed::DEFAULT_PRODUCTS;

/// A product plus its tombstone flag.
///
/// `removed` is set under the slot mutex by [`ProductCatalog::delete_product`],
/// so a caller that looked the slot up just before the delete still observes
/// `NotFound` once it gets the lock.
#[derive(Debug)]
struct Slot {
    product: Product,
    removed: bool,
}

type SlotRef = Arc<Mutex<Slot>>;

#[derive(Debug)]
struct CatalogState {
    products: BTreeMap<ProductId, SlotRef>,
    next_id: ProductId,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: BTreeMap::new(),
            next_id: ProductId::new(1),
        }
    }
}

/// Thread-safe, in-memory product catalog.
///
/// Cloning yields another handle to the same catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl ProductCatalog {
    /// Creates a new empty catalog. The first product gets id 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog stocked with the store's opening inventory.
    pub fn with_default_products() -> Result<Self> {
        let catalog = Self::new();
        for (name, cents, quantity, category) in DEFAULT_PRODUCTS {
            catalog.add_product(*name, Money::from_cents(*cents), *quantity, *category)?;
        }
        Ok(catalog)
    }

    /// Adds a product and returns the stored record.
    ///
    /// Ids increase monotonically and are never reused, even after deletion.
    #[tracing::instrument(skip(self, name, category), fields(name = tracing::field::Empty))]
    pub fn add_product(
        &self,
        name: impl Into<String>,
        unit_price: Money,
        stock_quantity: u32,
        category: impl Into<String>,
    ) -> Result<Product> {
        let name = name.into();
        let category = category.into();
        tracing::Span::current().record("name", name.as_str());

        validate_label("name", &name)?;
        validate_label("category", &category)?;
        validate_price(unit_price)?;

        let mut state = self.write_state();
        let id = state.next_id;
        state.next_id = id.next();

        let product = Product {
            id,
            name,
            unit_price,
            stock_quantity,
            category,
        };
        state.products.insert(
            id,
            Arc::new(Mutex::new(Slot {
                product: product.clone(),
                removed: false,
            })),
        );

        tracing::debug!(product_id = %id, "product added");
        Ok(product)
    }

    /// Returns a snapshot of a product.
    pub fn get_product(&self, id: ProductId) -> Result<Product> {
        let slot = self.slot(id)?;
        let guard = lock_slot(&slot);
        if guard.removed {
            return Err(CatalogError::NotFound(id));
        }
        Ok(guard.product.clone())
    }

    /// Returns snapshots of all products in ascending id order.
    pub fn list_products(&self) -> Vec<Product> {
        self.collect(|_| true)
    }

    /// Returns products with at least one unit in stock.
    pub fn list_available(&self) -> Vec<Product> {
        self.collect(Product::is_available)
    }

    /// Returns products whose stock is at or below `threshold`.
    pub fn list_low_stock(&self, threshold: u32) -> Vec<Product> {
        self.collect(|p| p.stock_quantity <= threshold)
    }

    /// Returns the number of products in the catalog.
    pub fn len(&self) -> usize {
        self.read_state().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().products.is_empty()
    }

    /// Overwrites the given mutable fields of a product.
    ///
    /// Stock edits made here take the same per-product lock as
    /// reservations, so an administrative write cannot lose a concurrent
    /// checkout's decrement.
    #[tracing::instrument(skip(self, update), fields(product_id = %id))]
    pub fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        update.validate()?;

        let slot = self.slot(id)?;
        let mut guard = lock_slot(&slot);
        if guard.removed {
            return Err(CatalogError::NotFound(id));
        }
        update.apply_to(&mut guard.product);

        tracing::debug!("product updated");
        Ok(guard.product.clone())
    }

    /// Removes a product. Its id is never handed out again.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub fn delete_product(&self, id: ProductId) -> Result<Product> {
        let slot = self
            .write_state()
            .products
            .remove(&id)
            .ok_or(CatalogError::NotFound(id))?;

        let mut guard = lock_slot(&slot);
        guard.removed = true;

        tracing::debug!("product deleted");
        Ok(guard.product.clone())
    }

    /// Atomically checks that `quantity` units are in stock and removes them.
    ///
    /// Returns the stock left after the decrement. On `InsufficientStock`
    /// nothing is mutated. Calls for the same product are linearizable: two
    /// callers racing for the last units cannot both succeed.
    ///
    /// A zero quantity means the caller has a bug; it trips a debug
    /// assertion and is reported as `InvalidInput` in release builds.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub fn try_reserve_and_decrement(&self, id: ProductId, quantity: u32) -> Result<u32> {
        debug_assert!(quantity > 0, "reservation quantity must be positive");
        if quantity == 0 {
            return Err(CatalogError::InvalidInput(
                "reservation quantity must be positive".to_string(),
            ));
        }

        let slot = match self.slot(id) {
            Ok(slot) => slot,
            Err(e) => {
                metrics::counter!("catalog_reservations_total", "outcome" => "not_found")
                    .increment(1);
                return Err(e);
            }
        };

        let mut guard = lock_slot(&slot);
        if guard.removed {
            metrics::counter!("catalog_reservations_total", "outcome" => "not_found").increment(1);
            return Err(CatalogError::NotFound(id));
        }

        let available = guard.product.stock_quantity;
        if available < quantity {
            metrics::counter!("catalog_reservations_total", "outcome" => "insufficient")
                .increment(1);
            tracing::debug!(requested = quantity, available, "reservation refused");
            return Err(CatalogError::InsufficientStock {
                product_id: id,
                requested: quantity,
                available,
            });
        }

        guard.product.stock_quantity = available - quantity;
        metrics::counter!("catalog_reservations_total", "outcome" => "reserved").increment(1);
        tracing::debug!(
            reserved = quantity,
            remaining = guard.product.stock_quantity,
            "stock reserved"
        );
        Ok(guard.product.stock_quantity)
    }

    /// Sets a product's stock to an absolute value.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub fn restock(&self, id: ProductId, new_quantity: u32) -> Result<()> {
        let slot = self.slot(id)?;
        let mut guard = lock_slot(&slot);
        if guard.removed {
            return Err(CatalogError::NotFound(id));
        }
        guard.product.stock_quantity = new_quantity;
        tracing::debug!(stock = new_quantity, "product restocked");
        Ok(())
    }

    /// Adds `delta` units to a product's stock and returns the new level.
    ///
    /// Used both for supplier deliveries and for rolling back a checkout's
    /// reservations. Saturates at `u32::MAX`.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub fn increase_stock(&self, id: ProductId, delta: u32) -> Result<u32> {
        let slot = self.slot(id)?;
        let mut guard = lock_slot(&slot);
        if guard.removed {
            return Err(CatalogError::NotFound(id));
        }
        guard.product.stock_quantity = guard.product.stock_quantity.saturating_add(delta);
        tracing::debug!(delta, stock = guard.product.stock_quantity, "stock increased");
        Ok(guard.product.stock_quantity)
    }

    fn slot(&self, id: ProductId) -> Result<SlotRef> {
        self.read_state()
            .products
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    fn collect(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        // Clone the slot handles first so no slot mutex is taken while the
        // map lock is held.
        let slots: Vec<SlotRef> = self.read_state().products.values().cloned().collect();

        slots
            .iter()
            .filter_map(|slot| {
                let guard = lock_slot(slot);
                (!guard.removed && keep(&guard.product)).then(|| guard.product.clone())
            })
            .collect()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_slot(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::MAX_UNIT_PRICE;

    fn catalog_with_apples() -> (ProductCatalog, ProductId) {
        let catalog = ProductCatalog::new();
        let apples = catalog
            .add_product("Apples", Money::from_cents(299), 50, "Fruits")
            .unwrap();
        (catalog, apples.id)
    }

    #[test]
    fn test_add_assigns_monotonic_ids() {
        let catalog = ProductCatalog::new();
        let a = catalog
            .add_product("Apples", Money::from_cents(299), 50, "Fruits")
            .unwrap();
        let b = catalog
            .add_product("Bananas", Money::from_cents(149), 30, "Fruits")
            .unwrap();

        assert_eq!(a.id, ProductId::new(1));
        assert_eq!(b.id, ProductId::new(2));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (catalog, apples) = catalog_with_apples();
        catalog.delete_product(apples).unwrap();

        let milk = catalog
            .add_product("Milk", Money::from_cents(399), 20, "Dairy")
            .unwrap();
        assert_eq!(milk.id, ProductId::new(2));
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let catalog = ProductCatalog::new();

        let negative = catalog.add_product("Apples", Money::from_cents(-1), 5, "Fruits");
        assert!(matches!(negative, Err(CatalogError::InvalidInput(_))));

        let no_name = catalog.add_product("", Money::from_cents(100), 5, "Fruits");
        assert!(matches!(no_name, Err(CatalogError::InvalidInput(_))));

        let no_category = catalog.add_product("Apples", Money::from_cents(100), 5, " ");
        assert!(matches!(no_category, Err(CatalogError::InvalidInput(_))));

        let gold = catalog.add_product("Gold", Money::from_cents(i64::MAX / 2 + 1), 5, "Luxury");
        assert!(matches!(gold, Err(CatalogError::InvalidInput(_))));

        assert!(catalog.is_empty());
    }

    #[test]
    fn test_price_ceiling_applies_to_updates() {
        let (catalog, apples) = catalog_with_apples();
        catalog
            .add_product("Caviar", MAX_UNIT_PRICE, 1, "Luxury")
            .unwrap();

        let raised = catalog.update_product(
            apples,
            ProductUpdate::new().unit_price(Money::from_cents(MAX_UNIT_PRICE.cents() + 1)),
        );
        assert!(matches!(raised, Err(CatalogError::InvalidInput(_))));
        assert_eq!(
            catalog.get_product(apples).unwrap().unit_price,
            Money::from_cents(299)
        );
    }

    #[test]
    fn test_failed_add_does_not_consume_an_id() {
        let catalog = ProductCatalog::new();
        let _ = catalog.add_product("", Money::from_cents(100), 5, "Fruits");
        let ok = catalog
            .add_product("Apples", Money::from_cents(299), 5, "Fruits")
            .unwrap();
        assert_eq!(ok.id, ProductId::new(1));
    }

    #[test]
    fn test_get_missing_product() {
        let catalog = ProductCatalog::new();
        let result = catalog.get_product(ProductId::new(42));
        assert_eq!(result, Err(CatalogError::NotFound(ProductId::new(42))));
    }

    #[test]
    fn test_list_products_is_a_snapshot() {
        let (catalog, apples) = catalog_with_apples();

        let mut listed = catalog.list_products();
        listed[0].stock_quantity = 0;
        listed[0].name = "Changed".to_string();

        let stored = catalog.get_product(apples).unwrap();
        assert_eq!(stored.stock_quantity, 50);
        assert_eq!(stored.name, "Apples");
    }

    #[test]
    fn test_list_products_is_idempotent() {
        let catalog = ProductCatalog::with_default_products().unwrap();
        assert_eq!(catalog.list_products(), catalog.list_products());
    }

    #[test]
    fn test_list_available_and_low_stock() {
        let catalog = ProductCatalog::new();
        catalog
            .add_product("Apples", Money::from_cents(299), 50, "Fruits")
            .unwrap();
        catalog
            .add_product("Milk", Money::from_cents(399), 0, "Dairy")
            .unwrap();
        catalog
            .add_product("Juice", Money::from_cents(449), 10, "Beverages")
            .unwrap();

        let available: Vec<_> = catalog
            .list_available()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(available, vec!["Apples", "Juice"]);

        let low: Vec<_> = catalog
            .list_low_stock(10)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(low, vec!["Milk", "Juice"]);
    }

    #[test]
    fn test_update_product() {
        let (catalog, apples) = catalog_with_apples();

        let updated = catalog
            .update_product(
                apples,
                ProductUpdate::new()
                    .name("Green Apples")
                    .unit_price(Money::from_cents(349))
                    .stock_quantity(60),
            )
            .unwrap();

        assert_eq!(updated.name, "Green Apples");
        assert_eq!(updated.unit_price, Money::from_cents(349));
        assert_eq!(updated.stock_quantity, 60);
        assert_eq!(updated.category, "Fruits");
        assert_eq!(catalog.get_product(apples).unwrap(), updated);
    }

    #[test]
    fn test_update_missing_or_invalid() {
        let (catalog, apples) = catalog_with_apples();

        let missing =
            catalog.update_product(ProductId::new(9), ProductUpdate::new().stock_quantity(1));
        assert_eq!(missing, Err(CatalogError::NotFound(ProductId::new(9))));

        let invalid = catalog.update_product(apples, ProductUpdate::new().name(""));
        assert!(matches!(invalid, Err(CatalogError::InvalidInput(_))));
        assert_eq!(catalog.get_product(apples).unwrap().name, "Apples");
    }

    #[test]
    fn test_delete_product() {
        let (catalog, apples) = catalog_with_apples();

        let deleted = catalog.delete_product(apples).unwrap();
        assert_eq!(deleted.name, "Apples");

        assert_eq!(catalog.get_product(apples), Err(CatalogError::NotFound(apples)));
        assert_eq!(
            catalog.try_reserve_and_decrement(apples, 1),
            Err(CatalogError::NotFound(apples))
        );
        assert_eq!(catalog.increase_stock(apples, 1), Err(CatalogError::NotFound(apples)));
        assert_eq!(catalog.delete_product(apples), Err(CatalogError::NotFound(apples)));
    }

    #[test]
    fn test_reserve_decrements_stock() {
        let (catalog, apples) = catalog_with_apples();

        let remaining = catalog.try_reserve_and_decrement(apples, 3).unwrap();
        assert_eq!(remaining, 47);
        assert_eq!(catalog.get_product(apples).unwrap().stock_quantity, 47);
    }

    #[test]
    fn test_reserve_exact_stock_then_refuse() {
        let (catalog, apples) = catalog_with_apples();

        assert_eq!(catalog.try_reserve_and_decrement(apples, 50), Ok(0));
        assert_eq!(
            catalog.try_reserve_and_decrement(apples, 1),
            Err(CatalogError::InsufficientStock {
                product_id: apples,
                requested: 1,
                available: 0,
            })
        );
        assert_eq!(catalog.get_product(apples).unwrap().stock_quantity, 0);
    }

    #[test]
    fn test_insufficient_stock_leaves_stock_untouched() {
        let (catalog, apples) = catalog_with_apples();

        let result = catalog.try_reserve_and_decrement(apples, 51);
        assert!(matches!(result, Err(CatalogError::InsufficientStock { .. })));
        assert!(result.unwrap_err().is_retryable());
        assert_eq!(catalog.get_product(apples).unwrap().stock_quantity, 50);
    }

    #[test]
    fn test_stock_never_negative_over_a_sequence() {
        let (catalog, apples) = catalog_with_apples();

        for quantity in [7, 13, 20, 9, 4, 1, 30, 2] {
            let _ = catalog.try_reserve_and_decrement(apples, quantity);
            let stock = catalog.get_product(apples).unwrap().stock_quantity;
            assert!(stock <= 50);
        }
        // 7 + 13 + 20 + 9 = 49; 4 no longer fits, 1 does, 30 and 2 do not.
        assert_eq!(catalog.get_product(apples).unwrap().stock_quantity, 0);
    }

    #[test]
    fn test_restock_and_increase() {
        let (catalog, apples) = catalog_with_apples();

        catalog.restock(apples, 5).unwrap();
        assert_eq!(catalog.get_product(apples).unwrap().stock_quantity, 5);

        assert_eq!(catalog.increase_stock(apples, 10), Ok(15));
        assert_eq!(catalog.increase_stock(apples, u32::MAX), Ok(u32::MAX));
    }

    #[test]
    fn test_default_products() {
        let catalog = ProductCatalog::with_default_products().unwrap();
        assert_eq!(catalog.len(), 10);

        let apples = catalog.get_product(ProductId::new(1)).unwrap();
        assert_eq!(apples.name, "Apples");
        assert_eq!(apples.unit_price, Money::from_cents(299));
        assert_eq!(apples.stock_quantity, 50);

        let juice = catalog.get_product(ProductId::new(10)).unwrap();
        assert_eq!(juice.name, "Orange Juice");
        assert_eq!(juice.stock_quantity, 12);
    }

    #[test]
    fn test_clones_share_state() {
        let (catalog, apples) = catalog_with_apples();
        let handle = catalog.clone();

        handle.try_reserve_and_decrement(apples, 10).unwrap();
        assert_eq!(catalog.get_product(apples).unwrap().stock_quantity, 40);
    }
}
