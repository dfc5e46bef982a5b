//! Opening inventory of the store.

/// `(name, unit price in cents, stock, category)` for each product the store
/// opens with, in id order.
pub const DEFAULT_PRODUCTS: &[(&str, i64, u32, &str)] = &[
    ("Apples", 299, 50, "Fruits"),
    ("Bananas", 149, 30, "Fruits"),
    ("Milk", 399, 20, "Dairy"),
    ("Bread", 249, 25, "Bakery"),
    ("Chicken Breast", 899, 15, "Meat"),
    ("Rice", 499, 40, "Grains"),
    ("Tomatoes", 349, 35, "Vegetables"),
    ("Cheese", 599, 18, "Dairy"),
    ("Eggs", 299, 22, "Dairy"),
    ("Orange Juice", 449, 12, "Beverages"),
];
