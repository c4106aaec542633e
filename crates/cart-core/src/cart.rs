//! The cart sequence.

use crate::error::CoreError;
use crate::ids::ProductId;
use crate::product::Product;
use serde::{Deserialize, Serialize};

/// An ordered sequence of products with unique ids.
///
/// Serializes as a bare JSON array, which is the persisted format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from existing items.
    ///
    /// Returns an error if an id appears twice or an amount is zero.
    pub fn from_items(items: Vec<Product>) -> Result<Self, CoreError> {
        let mut cart = Self::new();
        for item in items {
            if item.amount == 0 {
                return Err(CoreError::InvalidAmount {
                    product_id: item.id,
                    amount: 0,
                });
            }
            if cart.contains(item.id) {
                return Err(CoreError::DuplicateProduct(item.id));
            }
            cart.items.push(item);
        }
        Ok(cart)
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Iterate over items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.items.iter()
    }

    /// Index of a product, if present.
    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|p| p.id == id)
    }

    /// Get a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: ProductId) -> bool {
        self.position(id).is_some()
    }

    /// Append a product not yet in the cart with an amount of one.
    pub fn push_new(&mut self, mut product: Product) -> Result<(), CoreError> {
        if self.contains(product.id) {
            return Err(CoreError::DuplicateProduct(product.id));
        }
        product.amount = 1;
        self.items.push(product);
        Ok(())
    }

    /// Set the amount of a product already in the cart.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<(), CoreError> {
        if amount == 0 {
            return Err(CoreError::InvalidAmount {
                product_id: id,
                amount,
            });
        }
        let item = self
            .items
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::ProductNotInCart(id))?;
        item.amount = amount;
        Ok(())
    }

    /// Remove a product, keeping the order of the rest.
    pub fn remove(&mut self, id: ProductId) -> Result<Product, CoreError> {
        let index = self.position(id).ok_or(CoreError::ProductNotInCart(id))?;
        Ok(self.items.remove(index))
    }

    /// Total units (sum of amounts).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Number of distinct products.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line subtotals.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(Product::subtotal).sum()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
