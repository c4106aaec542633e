//! In-memory catalog, optionally loaded from a fixture file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use cart_core::{Product, ProductId, Stock};
use serde::Deserialize;

use crate::{Catalog, FetchError};

/// Layout of a json-server style database file.
#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    stock: Vec<Stock>,
}

/// Catalog answering from records held in memory.
///
/// Useful for offline runs and tests. Unknown ids produce
/// [`FetchError::NotFound`], the same way a missing record would upstream.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
    stock: RwLock<HashMap<ProductId, Stock>>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records.
    pub fn from_records(products: Vec<Product>, stock: Vec<Stock>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().map(|p| (p.id, p)).collect()),
            stock: RwLock::new(stock.into_iter().map(|s| (s.id, s)).collect()),
        }
    }

    /// Parse a fixture of the form `{"products": [...], "stock": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, FetchError> {
        let file: FixtureFile = serde_json::from_str(json)?;
        Ok(Self::from_records(file.products, file.stock))
    }

    /// Load a fixture file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            products = catalog.product_count(),
            "loaded catalog fixture"
        );
        Ok(catalog)
    }

    /// Add or replace a product record.
    pub fn insert_product(&self, product: Product) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.id, product);
    }

    /// Set the available units for a product.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        self.stock
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Stock::new(id, amount));
    }

    /// Number of product records.
    pub fn product_count(&self) -> usize {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, FetchError> {
        self.stock
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
            .ok_or(FetchError::NotFound {
                resource: "stock",
                id: id.get(),
            })
    }

    async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(FetchError::NotFound {
                resource: "product",
                id: id.get(),
            })
    }
}
