//! Type-safe key-value persistence for the shopping cart.
//!
//! Provides a small string-blob store abstraction ([`KeyValueStore`]) with an
//! in-memory and a file-backed implementation, plus [`Cache`], which layers
//! automatic JSON serialization on top of any store.
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_storage::{Cache, FileStore};
//! use std::sync::Arc;
//!
//! let cache = Cache::new(Arc::new(FileStore::open(".cart")?));
//!
//! // Store a value
//! cache.set("@RocketShoes:cart", &cart)?;
//!
//! // Retrieve a value
//! let cart: Option<Cart> = cache.get("@RocketShoes:cart")?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{Cache, KeyValueStore};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore};
}
