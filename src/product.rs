use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::store::{self, Store, PRODUCTS};

/// Threshold used by `low_stock` when a product has no alert level set.
pub const DEFAULT_LOW_STOCK_ALERT: i64 = 5;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub cost_price: Option<f64>,
    /// May go negative; no floor is enforced.
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub unit: Option<String>,
    /// Tax classification code carried onto invoice items at time of sale.
    #[serde(default)]
    pub tax_code: Option<String>,
    #[serde(default)]
    pub low_stock_alert: Option<i64>,
}

impl Product {
    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_alert.unwrap_or(DEFAULT_LOW_STOCK_ALERT)
    }
}

pub fn list_products(store: &impl Store) -> Result<Vec<Product>> {
    store::load_collection(store, PRODUCTS)
}

/// Insert-or-replace by id. Assigns identity at creation if absent.
pub fn save_product(store: &impl Store, mut product: Product) -> Result<Product> {
    let mut products = list_products(store)?;

    if product.id.is_empty() {
        product.id = store::new_id();
    }

    match products.iter().position(|p| p.id == product.id) {
        Some(idx) => products[idx] = product.clone(),
        None => products.push(product.clone()),
    }

    store::save_collection(store, PRODUCTS, &products)?;
    Ok(product)
}

/// Filter-and-rewrite. Invoices referencing the product keep their
/// denormalized name/rate and are not repaired.
pub fn delete_product(store: &impl Store, id: &str) -> Result<()> {
    let products: Vec<Product> = list_products(store)?
        .into_iter()
        .filter(|p| p.id != id)
        .collect();
    store::save_collection(store, PRODUCTS, &products)
}

pub fn get_product(store: &impl Store, id: &str) -> Result<Option<Product>> {
    Ok(list_products(store)?.into_iter().find(|p| p.id == id))
}

/// Apply a signed stock delta. Returns Ok(false) when the product does
/// not exist; callers on the invoice path ignore the flag and continue.
pub fn adjust_stock(store: &impl Store, product_id: &str, delta: i64) -> Result<bool> {
    let Some(mut product) = get_product(store, product_id)? else {
        warn!(product_id, delta, "stock adjustment skipped: product not found");
        return Ok(false);
    };

    product.stock += delta;
    save_product(store, product)?;
    Ok(true)
}

/// False when the product is missing or stock is below the requested quantity.
pub fn has_enough_stock(store: &impl Store, product_id: &str, requested: i64) -> Result<bool> {
    match get_product(store, product_id)? {
        Some(product) => Ok(product.stock >= requested),
        None => Ok(false),
    }
}

/// Products at or below their low-stock threshold.
pub fn low_stock(store: &impl Store) -> Result<Vec<Product>> {
    Ok(list_products(store)?
        .into_iter()
        .filter(|p| p.stock <= p.low_stock_threshold())
        .collect())
}

/// Products with zero or negative stock.
pub fn out_of_stock(store: &impl Store) -> Result<Vec<Product>> {
    Ok(list_products(store)?
        .into_iter()
        .filter(|p| p.stock <= 0)
        .collect())
}
