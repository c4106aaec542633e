//! Sharing one store across an application.
//!
//! A [`CartProvider`] is created once at startup and hands out
//! [`CartContext`]s to whatever needs the cart. Looking the store up from a
//! context that no provider populated is an error, so a consumer wired up
//! outside the provider fails loudly at integration time.

use std::sync::Arc;

use crate::error::CartError;
use crate::store::CartStore;

/// Owns the application's single [`CartStore`].
#[derive(Debug, Clone)]
pub struct CartProvider {
    store: Arc<CartStore>,
}

impl CartProvider {
    /// Take ownership of a store.
    pub fn new(store: CartStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// A context that resolves to this provider's store.
    pub fn context(&self) -> CartContext {
        CartContext {
            store: Some(self.store.clone()),
        }
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<CartStore> {
        &self.store
    }
}

/// Handle consumers carry to reach the cart.
///
/// `CartContext::default()` is an unpopulated context.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    store: Option<Arc<CartStore>>,
}

/// Resolve the cart store from a context.
pub fn use_cart(ctx: &CartContext) -> Result<Arc<CartStore>, CartError> {
    ctx.store.clone().ok_or(CartError::NoProvider)
}
