//! Catalog records: products and stock levels.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A product as served by the catalog, and as held in the cart.
///
/// Display fields are opaque to the cart: they are carried through
/// serialization unchanged. Fields the catalog sends that are not modelled
/// here end up in `extra` so a persisted cart never drops data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Quantity held in the cart. Catalog records omit it.
    #[serde(default)]
    pub amount: u32,
    /// Any other fields the catalog returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product record with no cart amount.
    pub fn new(id: ProductId, title: impl Into<String>, price: f64, image: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            amount: 0,
            extra: Map::new(),
        }
    }

    /// Set the cart amount.
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Line subtotal (price times amount).
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.amount)
    }
}

/// Units available upstream for a product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stock {
    /// Product this stock level belongs to.
    pub id: ProductId,
    /// Units available.
    pub amount: u32,
}

impl Stock {
    /// Create a stock level.
    pub fn new(id: ProductId, amount: u32) -> Self {
        Self { id, amount }
    }

    /// Check whether `amount` units can be held in a cart.
    pub fn can_fulfill(&self, amount: u32) -> bool {
        amount <= self.amount
    }

    /// Check if nothing is available.
    pub fn is_out_of_stock(&self) -> bool {
        self.amount == 0
    }
}
