//! Cart store error types.

use std::fmt;

use cart_catalog::FetchError;
use cart_core::{CoreError, ProductId};
use cart_storage::CacheError;
use thiserror::Error;

use crate::notice::NoticeKind;

/// The store operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    Update,
    Clear,
    Reload,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::Update => "update",
            Operation::Clear => "clear",
            Operation::Reload => "reload",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by cart operations.
///
/// `OutOfStock` and `NotInCart` are ordinary rejections; the remaining
/// variants are faults in a collaborator or in how the store was wired.
#[derive(Error, Debug)]
pub enum CartError {
    /// Requested quantity exceeds what the catalog has.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    /// The product is not in the cart.
    #[error("Product not in cart: {0}")]
    NotInCart(ProductId),

    /// The catalog could not be reached or answered badly.
    #[error("Catalog error: {0}")]
    Catalog(#[from] FetchError),

    /// Reading or writing the persisted cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] CacheError),

    /// A cart invariant was violated.
    #[error("Cart error: {0}")]
    Core(#[from] CoreError),

    /// The cart was looked up from a context no provider populated.
    #[error("No cart provider in this context")]
    NoProvider,
}

impl CartError {
    /// Whether this is an ordinary domain rejection rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CartError::OutOfStock { .. } | CartError::NotInCart(_))
    }

    /// Notice to show the shopper when `op` fails with this error.
    ///
    /// Reloading is not shopper-initiated and has no notice.
    pub fn notice_kind(&self, op: Operation) -> Option<NoticeKind> {
        if let CartError::OutOfStock { .. } = self {
            return Some(NoticeKind::OutOfStock);
        }
        match op {
            Operation::Add => Some(NoticeKind::AddFailed),
            Operation::Remove => Some(NoticeKind::RemoveFailed),
            Operation::Update => Some(NoticeKind::UpdateFailed),
            Operation::Clear => Some(NoticeKind::ClearFailed),
            Operation::Reload => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_wins_for_every_operation() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        };
        for op in [Operation::Add, Operation::Update] {
            assert_eq!(err.notice_kind(op), Some(NoticeKind::OutOfStock));
        }
        assert!(err.is_rejection());
    }

    #[test]
    fn test_faults_map_to_operation_failure() {
        let err = CartError::Catalog(FetchError::Timeout("slow".into()));
        assert_eq!(err.notice_kind(Operation::Add), Some(NoticeKind::AddFailed));
        assert_eq!(err.notice_kind(Operation::Update), Some(NoticeKind::UpdateFailed));
        assert_eq!(err.notice_kind(Operation::Reload), None);
        assert!(!err.is_rejection());

        let missing = CartError::NotInCart(ProductId::new(4));
        assert_eq!(missing.notice_kind(Operation::Remove), Some(NoticeKind::RemoveFailed));
    }
}
