//! Catalog service clients for stock and product lookups.
//!
//! The cart only ever asks the catalog two questions: how many units of a
//! product are available, and what the full product record looks like. The
//! [`Catalog`] trait captures exactly that, with two implementations:
//!
//! - [`HttpCatalog`] - `GET {base}/stock/{id}` and `GET {base}/products/{id}`
//! - [`StaticCatalog`] - records held in memory, optionally loaded from a
//!   json-server style fixture file
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_catalog::{Catalog, HttpCatalog};
//! use cart_core::ProductId;
//!
//! let catalog = HttpCatalog::new("http://localhost:3333")?;
//! let stock = catalog.stock(ProductId::new(1)).await?;
//! println!("{} units available", stock.amount);
//! ```

mod config;
mod error;
mod fixture;
mod http;

use std::sync::Arc;

use async_trait::async_trait;
use cart_core::{Product, ProductId, Stock};

pub use config::CatalogConfig;
pub use error::FetchError;
pub use fixture::StaticCatalog;
pub use http::HttpCatalog;

/// Read-only access to the remote catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the current stock level for a product.
    async fn stock(&self, id: ProductId) -> Result<Stock, FetchError>;

    /// Fetch the full product record.
    async fn product(&self, id: ProductId) -> Result<Product, FetchError>;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    async fn stock(&self, id: ProductId) -> Result<Stock, FetchError> {
        (**self).stock(id).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
        (**self).product(id).await
    }
}

/// Build the catalog described by `config`.
///
/// A configured fixture file takes precedence over the HTTP base URL.
pub fn open(config: &CatalogConfig) -> Result<Arc<dyn Catalog>, FetchError> {
    match &config.fixture {
        Some(path) => Ok(Arc::new(StaticCatalog::from_path(path)?)),
        None => Ok(Arc::new(HttpCatalog::with_timeout(
            &config.base_url,
            config.timeout(),
        )?)),
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Catalog, CatalogConfig, FetchError, HttpCatalog, StaticCatalog};
}
