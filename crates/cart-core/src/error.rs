//! Core error types.

use crate::ids::ProductId;
use thiserror::Error;

/// Errors raised by cart invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The product is already present in the cart.
    #[error("Product already in cart: {0}")]
    DuplicateProduct(ProductId),

    /// The product is not present in the cart.
    #[error("Product not in cart: {0}")]
    ProductNotInCart(ProductId),

    /// A cart amount must be at least one.
    #[error("Invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: u32 },

    /// The catalog returned a record for a different product than requested.
    #[error("Catalog returned product {got} when {expected} was requested")]
    IdMismatch { expected: ProductId, got: ProductId },
}
