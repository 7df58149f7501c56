//! Application-wide loading indicator.
//!
//! Every outstanding catalog request holds a [`LoadingGuard`]. The flag is
//! `true` while at least one guard is alive, so two overlapping fetches cannot
//! clear it early.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// Counts outstanding requests and publishes whether any is in flight.
#[derive(Clone)]
pub struct LoadingTracker {
    inner: Arc<LoadingInner>,
}

struct LoadingInner {
    in_flight: AtomicUsize,
    flag: watch::Sender<bool>,
}

impl std::fmt::Debug for LoadingTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingTracker")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            inner: Arc::new(LoadingInner {
                in_flight: AtomicUsize::new(0),
                flag,
            }),
        }
    }

    /// Mark one request as started. Dropping the guard marks it settled.
    #[must_use = "the request counts as settled as soon as the guard is dropped"]
    pub fn begin(&self) -> LoadingGuard {
        self.inner.update(|n| n + 1);
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Whether any request is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.inner.flag.borrow()
    }

    /// Number of outstanding requests.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Subscribe to flag changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.flag.subscribe()
    }
}

impl LoadingInner {
    /// Apply `f` to the counter while holding the flag's lock, so counter and
    /// flag always change together.
    fn update(&self, f: impl FnOnce(usize) -> usize) {
        self.flag.send_if_modified(|loading| {
            let current = self.in_flight.load(Ordering::Acquire);
            let next = f(current);
            self.in_flight.store(next, Ordering::Release);
            let now_loading = next > 0;
            if *loading == now_loading {
                false
            } else {
                *loading = now_loading;
                true
            }
        });
    }
}

/// Scope of one outstanding request.
#[derive(Debug)]
pub struct LoadingGuard {
    inner: Arc<LoadingInner>,
}

impl std::fmt::Debug for LoadingInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingInner")
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.inner.update(|n| n.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_follows_guard_lifetime() {
        let tracker = LoadingTracker::new();
        assert!(!tracker.is_loading());

        let guard = tracker.begin();
        assert!(tracker.is_loading());

        drop(guard);
        assert!(!tracker.is_loading());
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn test_overlapping_requests_keep_flag_until_last_settles() {
        let tracker = LoadingTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        drop(first);
        assert!(tracker.is_loading());
        assert_eq!(tracker.in_flight(), 1);

        drop(second);
        assert!(!tracker.is_loading());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified_on_transitions_only() {
        let tracker = LoadingTracker::new();
        let mut rx = tracker.subscribe();

        let a = tracker.begin();
        let b = tracker.begin();
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        drop(a);
        assert!(!rx.has_changed().unwrap());

        drop(b);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
    }
}
