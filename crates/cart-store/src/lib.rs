//! Stock-validated shopping cart state with local persistence.
//!
//! [`CartStore`] holds the shopper's cart, checks every change against the
//! catalog's stock, and writes the whole cart back to a key-value store after
//! each successful change.
//!
//! # Operations
//!
//! - [`CartStore::add_product`] - add one unit (appending new products)
//! - [`CartStore::remove_product`] - drop a product entirely
//! - [`CartStore::update_product_amount`] - set a quantity
//! - [`CartStore::clear`] - empty the cart
//! - [`CartStore::cart`] - read a snapshot
//!
//! Rejected operations return a typed [`CartError`] and also emit a
//! [`Notice`] through the configured [`Notifier`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_store::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = cart_catalog::HttpCatalog::new("http://localhost:3333")?;
//! let storage = cart_storage::FileStore::open(".cart")?;
//!
//! let store = CartStore::builder(Arc::new(catalog), Arc::new(storage)).build()?;
//! let provider = CartProvider::new(store);
//!
//! // Anywhere the context was handed to:
//! let cart = use_cart(&provider.context())?;
//! cart.add_product(ProductId::new(5)).await?;
//! ```

mod config;
mod context;
mod error;
mod notice;
mod store;

pub use config::{StoreConfig, DEFAULT_STORAGE_KEY};
pub use context::{use_cart, CartContext, CartProvider};
pub use error::{CartError, Operation};
pub use notice::{Notice, NoticeKind, Notifier, NoopNotifier, RecordingNotifier, TracingNotifier};
pub use store::{CartOutcome, CartStore, CartStoreBuilder};

pub use cart_core::{Cart, Product, ProductId, Stock};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        use_cart, Cart, CartContext, CartError, CartOutcome, CartProvider, CartStore, Notice,
        NoticeKind, Notifier, Product, ProductId, StoreConfig,
    };
}
