//! Application-wide toast notifications.
//!
//! [`Notifier`] is a typed publish/subscribe channel with a single active
//! toast slot. Any component holding a clone may emit; the toast region of
//! the layout subscribes through the `/events` stream.
//!
//! # Behavior
//!
//! - The active toast is always the most recent emission.
//! - Emitting while a toast is visible replaces it and restarts its timer.
//! - A toast hides itself after the configured duration (5 s by default).
//! - An explicit close hides it; a click-away gesture does not.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Deserialize;
use shop_console_core::{Severity, Toast};
use tokio::sync::watch;
use tracing::debug;

/// A toast currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveToast {
    /// Emission sequence number, used to match dismissals and timeouts.
    pub id: u64,
    pub toast: Toast,
}

/// Why the user tried to hide a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    /// Close button.
    Close,
    /// Click outside the toast. Ignored to avoid accidental dismissal.
    ClickAway,
}

/// Single-slot toast channel shared across the application.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    slot: watch::Sender<Option<ActiveToast>>,
    sequence: AtomicU64,
    duration: Duration,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("duration", &self.inner.duration)
            .field("active", &*self.inner.slot.borrow())
            .finish()
    }
}

impl Notifier {
    /// Create a notifier whose toasts stay visible for `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            inner: Arc::new(NotifierInner {
                slot,
                sequence: AtomicU64::new(0),
                duration,
            }),
        }
    }

    /// Show a toast, replacing any visible one and restarting the timer.
    ///
    /// Returns the id of the new toast.
    pub fn notify(&self, toast: Toast) -> u64 {
        let id = self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(toast_id = id, severity = %toast.severity, "Showing toast");
        self.inner.slot.send_replace(Some(ActiveToast { id, toast }));
        self.schedule_expiry(id);
        id
    }

    /// Show a success toast.
    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(Toast::success(message))
    }

    /// Show an error toast.
    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(Toast::error(message))
    }

    /// Show a warning toast.
    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.notify(Toast::new(Severity::Warning, message))
    }

    /// Show an informational toast.
    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(Toast::new(Severity::Info, message))
    }

    /// Try to hide toast `id`.
    ///
    /// Returns whether the toast was hidden. Click-away never hides, and a
    /// dismissal aimed at a toast that was already replaced is a no-op.
    pub fn dismiss(&self, id: u64, reason: DismissReason) -> bool {
        if reason == DismissReason::ClickAway {
            return false;
        }
        self.inner.hide(id)
    }

    /// The toast currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<ActiveToast> {
        self.inner.slot.borrow().clone()
    }

    /// Subscribe to toast changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<ActiveToast>> {
        self.inner.slot.subscribe()
    }

    /// Visible duration of each toast.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    fn schedule_expiry(&self, id: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(toast_id = id, "No runtime, toast will not expire on its own");
            return;
        };
        let inner: Weak<NotifierInner> = Arc::downgrade(&self.inner);
        let duration = self.inner.duration;
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = inner.upgrade()
                && inner.hide(id)
            {
                debug!(toast_id = id, "Toast expired");
            }
        });
    }
}

impl NotifierInner {
    /// Hide the active toast if it is still `id`.
    fn hide(&self, id: u64) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.as_ref().is_some_and(|active| active.id == id) {
                *slot = None;
                true
            } else {
                false
            }
        })
    }
}
