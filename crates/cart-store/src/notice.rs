//! User-facing notifications.
//!
//! Every rejected cart operation surfaces a short, human-readable notice
//! (a toast in a browser, a styled line in a terminal). The store emits them
//! through a [`Notifier`] chosen by whoever builds it.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// What went wrong, from the shopper's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Requested quantity exceeds available stock.
    OutOfStock,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a quantity failed.
    UpdateFailed,
    /// Emptying the cart failed.
    ClearFailed,
}

impl NoticeKind {
    /// Message shown to the shopper.
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::OutOfStock => "Requested quantity is out of stock",
            NoticeKind::AddFailed => "Failed to add product",
            NoticeKind::RemoveFailed => "Failed to remove product",
            NoticeKind::UpdateFailed => "Failed to update product quantity",
            NoticeKind::ClearFailed => "Failed to empty cart",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Notice category.
    pub kind: NoticeKind,
    /// Display text.
    pub message: String,
}

impl Notice {
    /// Create a notice with the kind's standard message.
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
        }
    }
}

impl From<NoticeKind> for Notice {
    fn from(kind: NoticeKind) -> Self {
        Self::new(kind)
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    /// Show a notice.
    fn notify(&self, notice: &Notice);
}

/// Emits each notice as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::warn!(kind = ?notice.kind, "{}", notice.message);
    }
}

/// Discards every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) {}
}

/// Collects notices so callers can render or inspect them later.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Kinds recorded so far, in order.
    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices().into_iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}
