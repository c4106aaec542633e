//! Domain types for the stock-validated shopping cart.
//!
//! This crate provides the plain data the rest of the workspace moves around:
//!
//! - **Catalog records**: [`Product`] and [`Stock`] as the catalog service returns them
//! - **Cart**: the ordered, id-unique sequence of products held by a shopper
//! - **Price formatting**: helpers for displaying prices and subtotals
//!
//! Nothing here performs I/O. Fetching and persistence live in `cart-catalog`
//! and `cart-storage`.
//!
//! # Example
//!
//! ```rust
//! use cart_core::prelude::*;
//!
//! let shoe = Product::new(ProductId::new(5), "Shoe", 179.9, "https://img/shoe.jpg");
//!
//! let mut cart = Cart::new();
//! cart.push_new(shoe).unwrap();
//!
//! assert_eq!(cart.item_count(), 1);
//! assert_eq!(cart.get(ProductId::new(5)).map(|p| p.amount), Some(1));
//! ```

pub mod cart;
pub mod error;
pub mod ids;
pub mod price;
pub mod product;

pub use cart::Cart;
pub use error::CoreError;
pub use ids::ProductId;
pub use price::{format_plain, format_price};
pub use product::{Product, Stock};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::Cart;
    pub use crate::error::CoreError;
    pub use crate::ids::ProductId;
    pub use crate::price::{format_plain, format_price};
    pub use crate::product::{Product, Stock};
}
