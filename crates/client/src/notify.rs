//! Transient user-facing messages.
//!
//! One message slot, like a toast: a new message replaces the previous one
//! and every message disappears on its own once its lifetime has passed.
//! Nothing here blocks; callers just read what is currently visible.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Visual style of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl std::fmt::Display for ToastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message with its display deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    expires_at: Instant,
}

impl Toast {
    /// Whether the message is still visible at `now`.
    #[must_use]
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Shared handle to the message slot.
#[derive(Debug, Clone)]
pub struct Notifier {
    ttl: Duration,
    slot: Arc<Mutex<Option<Toast>>>,
}

impl Notifier {
    /// Create a notifier whose messages last `ttl` unless told otherwise.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Show a success message for the default lifetime.
    pub fn success(&self, message: impl Into<String>) {
        self.show_for(ToastKind::Success, message, self.ttl);
    }

    /// Show an error message for the default lifetime.
    pub fn error(&self, message: impl Into<String>) {
        self.show_for(ToastKind::Error, message, self.ttl);
    }

    /// Show a message for an explicit lifetime, replacing the current one.
    pub fn show_for(&self, kind: ToastKind, message: impl Into<String>, ttl: Duration) {
        let message = message.into();
        match kind {
            ToastKind::Success => tracing::info!(%message, "Notice"),
            ToastKind::Error => tracing::warn!(%message, "Notice"),
        }

        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Toast {
            kind,
            message,
            expires_at: Instant::now() + ttl,
        });
    }

    /// The visible message, if any. Expired messages are dropped.
    #[must_use]
    pub fn current(&self) -> Option<Toast> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot
            .as_ref()
            .is_some_and(|toast| !toast.is_visible_at(Instant::now()))
        {
            *slot = None;
        }
        slot.clone()
    }

    /// Hide the current message immediately.
    pub fn dismiss(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_replaces_old() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.success("Student added successfully");
        notifier.error("Network error");

        let toast = notifier.current();
        assert_eq!(toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
        assert_eq!(toast.map(|t| t.message).as_deref(), Some("Network error"));
    }

    #[test]
    fn test_message_expires() {
        let notifier = Notifier::new(Duration::ZERO);
        notifier.error("gone");
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_dismiss() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.success("hello");
        notifier.clone().dismiss();
        assert!(notifier.current().is_none());
    }
}
