//! Registry of mounted list views.
//!
//! Rendering a list page mounts a [`ListController`] under a fresh id. The
//! page then drives it through `/live/{id}/...` and receives updates on
//! `/live/{id}/events`. The controller is dropped when the page's event
//! stream closes or the page explicitly unmounts it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use shop_console_core::{Category, Product, Shop};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::list::{ListController, ListInput, ViewClosed};

/// Views whose event stream never connected are dropped after this long.
const ORPHAN_TTL: Duration = Duration::from_secs(60);

/// Which entity a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Shops,
    Products,
    Categories,
}

/// A mounted controller of any entity type.
#[derive(Debug)]
pub enum LiveList {
    Shops(ListController<Shop>),
    Products(ListController<Product>),
    Categories(ListController<Category>),
}

impl LiveList {
    #[must_use]
    pub const fn kind(&self) -> ListKind {
        match self {
            Self::Shops(_) => ListKind::Shops,
            Self::Products(_) => ListKind::Products,
            Self::Categories(_) => ListKind::Categories,
        }
    }

    /// Forward an input to the controller.
    ///
    /// # Errors
    ///
    /// Returns `ViewClosed` if the controller task has stopped.
    pub fn send(&self, input: ListInput) -> Result<(), ViewClosed> {
        match self {
            Self::Shops(c) => c.send(input),
            Self::Products(c) => c.send(input),
            Self::Categories(c) => c.send(input),
        }
    }
}

struct Entry {
    list: LiveList,
    mounted_at: Instant,
    attached: bool,
}

/// Mounted list views keyed by view id.
#[derive(Clone, Default)]
pub struct LiveViews {
    entries: Arc<Mutex<HashMap<Uuid, Entry>>>,
}

impl std::fmt::Debug for LiveViews {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveViews")
            .field("mounted", &self.len())
            .finish()
    }
}

impl LiveViews {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a controller and return its view id.
    ///
    /// Also drops views that were mounted long ago but never attached.
    pub fn mount(&self, list: LiveList) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut entries = self.lock();

        let before = entries.len();
        entries.retain(|_, e| e.attached || now.duration_since(e.mounted_at) < ORPHAN_TTL);
        let swept = before - entries.len();
        if swept > 0 {
            debug!(swept, "Dropped orphaned list views");
        }

        debug!(view_id = %id, kind = ?list.kind(), "Mounted list view");
        entries.insert(
            id,
            Entry {
                list,
                mounted_at: now,
                attached: false,
            },
        );
        id
    }

    /// Run `f` against a mounted view.
    pub fn with<R>(&self, id: Uuid, f: impl FnOnce(&LiveList) -> R) -> Option<R> {
        self.lock().get(&id).map(|e| f(&e.list))
    }

    /// Like [`with`](Self::with), also marking the view as attached to an
    /// event stream so it is never swept as an orphan.
    pub fn attach<R>(&self, id: Uuid, f: impl FnOnce(&LiveList) -> R) -> Option<R> {
        self.lock().get_mut(&id).map(|e| {
            e.attached = true;
            f(&e.list)
        })
    }

    /// Forward an input to a mounted view.
    ///
    /// Returns `false` if the view is unknown or its controller has stopped.
    pub fn send(&self, id: Uuid, input: ListInput) -> bool {
        self.with(id, |list| list.send(input).is_ok())
            .unwrap_or(false)
    }

    /// Drop a view and its controller. Returns whether it was mounted.
    pub fn unmount(&self, id: Uuid) -> bool {
        let removed = self.lock().remove(&id);
        if removed.is_some() {
            debug!(view_id = %id, "Unmounted list view");
        }
        removed.is_some()
    }

    /// Number of mounted views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unmounts a view when dropped. Held by the view's event stream.
#[derive(Debug)]
pub struct MountGuard {
    views: LiveViews,
    id: Uuid,
}

impl MountGuard {
    #[must_use]
    pub const fn new(views: LiveViews, id: Uuid) -> Self {
        Self { views, id }
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.views.unmount(self.id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shop_console_core::{CategoryId, Page};

    use super::*;
    use crate::api::ApiError;
    use crate::list::{ListQuery, ListRequest, ListSettings, ListSource};
    use crate::loading::LoadingTracker;

    struct OneCategory;

    impl ListSource for OneCategory {
        type Item = Category;

        async fn fetch(&self, request: ListRequest) -> Result<Page<Category>, ApiError> {
            let item = Category {
                id: CategoryId::new(1),
                name: "Bio".to_string(),
            };
            Ok(Page::new(vec![item], 1, request.page_index, request.page_size))
        }
    }

    fn categories() -> LiveList {
        LiveList::Categories(ListController::spawn(
            Arc::new(OneCategory),
            ListSettings {
                page_size: 9,
                search_debounce: Duration::from_millis(300),
            },
            LoadingTracker::new(),
            ListQuery::default(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_send_and_unmount() {
        let views = LiveViews::new();
        let id = views.mount(categories());

        assert_eq!(views.with(id, LiveList::kind), Some(ListKind::Categories));
        assert!(views.send(id, ListInput::Refresh));

        assert!(views.unmount(id));
        assert!(!views.send(id, ListInput::Refresh));
        assert!(views.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_orphans_are_swept_but_attached_views_stay() {
        let views = LiveViews::new();
        let orphan = views.mount(categories());
        let attached = views.mount(categories());
        views.attach(attached, |_| ()).unwrap();

        tokio::time::sleep(ORPHAN_TTL + Duration::from_secs(1)).await;
        let fresh = views.mount(categories());

        assert!(views.with(orphan, |_| ()).is_none());
        assert!(views.with(attached, |_| ()).is_some());
        assert!(views.with(fresh, |_| ()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_unmounts_on_drop() {
        let views = LiveViews::new();
        let id = views.mount(categories());

        drop(MountGuard::new(views.clone(), id));
        assert!(views.with(id, |_| ()).is_none());
    }
}
