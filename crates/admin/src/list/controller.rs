//! Paginated, sortable, filterable, searchable list controller.
//!
//! Each mounted list view owns one [`ListController`]. The controller runs as
//! a task that receives [`ListInput`]s, issues fetches against a
//! [`ListSource`] and publishes the resulting [`ListView`] on a watch
//! channel.
//!
//! # Fetch rules
//!
//! - Page, sort and filter changes fetch immediately.
//! - Search changes reset to the first page and fetch after a quiet period.
//!   Each new search keystroke restarts the period.
//! - An immediate fetch cancels any pending search fetch.
//! - Every fetch carries a generation number. Only the response of the most
//!   recent fetch is applied; older responses are dropped.
//! - Dropping the controller stops the task. Responses still in flight are
//!   discarded.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shop_console_core::Page;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use super::query::{ListQuery, ListRequest};
use crate::api::ApiError;
use crate::loading::{LoadingGuard, LoadingTracker};

/// Anything that can serve one page of a list.
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    fn fetch(
        &self,
        request: ListRequest,
    ) -> impl Future<Output = Result<Page<Self::Item>, ApiError>> + Send;
}

/// Sizes and timings of one list.
#[derive(Debug, Clone, Copy)]
pub struct ListSettings {
    pub page_size: u32,
    pub search_debounce: Duration,
}

/// User intent sent to a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListInput {
    /// 1-based page number from the pagination controls.
    Page(u32),
    Sort(Option<String>),
    Filter(Option<String>),
    Search(String),
    /// Re-fetch the current query, e.g. after a deletion.
    Refresh,
}

/// Renderable state of a list.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    /// 1-based page number of `items`.
    pub displayed_page: u32,
    /// Whether at least one response has been applied.
    pub loaded: bool,
    /// Whether any fetch has answered, successfully or not.
    pub settled: bool,
    /// Query that produced `items`.
    pub query: ListQuery,
    /// Generation of the applied response.
    pub generation: u64,
}

impl<T> ListView<T> {
    fn initial(query: ListQuery) -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
            displayed_page: query.page_index + 1,
            loaded: false,
            settled: false,
            query,
            generation: 0,
        }
    }
}

/// The controller task has stopped.
#[derive(Debug, Error)]
#[error("List view is no longer active")]
pub struct ViewClosed;

/// Handle to a running list controller.
///
/// Dropping the handle unmounts the list.
#[derive(Debug)]
pub struct ListController<T> {
    commands: mpsc::UnboundedSender<ListInput>,
    view: watch::Receiver<ListView<T>>,
}

impl<T: Clone + Send + Sync + 'static> ListController<T> {
    /// Start a controller and issue the first fetch for `query`.
    pub fn spawn<S>(
        source: Arc<S>,
        settings: ListSettings,
        loading: LoadingTracker,
        query: ListQuery,
    ) -> Self
    where
        S: ListSource<Item = T>,
    {
        let (commands, inputs) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(ListView::initial(query.clone()));
        let (completions_tx, completions) = mpsc::unbounded_channel();

        let worker = Worker {
            source,
            settings,
            loading,
            query,
            generation: 0,
            view: view_tx,
            completions_tx,
        };
        tokio::spawn(worker.run(inputs, completions));

        Self { commands, view }
    }

    /// Send an input to the controller.
    ///
    /// # Errors
    ///
    /// Returns `ViewClosed` if the controller task has stopped.
    pub fn send(&self, input: ListInput) -> Result<(), ViewClosed> {
        self.commands.send(input).map_err(|_| ViewClosed)
    }

    /// Go to a 1-based page.
    ///
    /// # Errors
    ///
    /// Returns `ViewClosed` if the controller task has stopped.
    pub fn select_page(&self, displayed: u32) -> Result<(), ViewClosed> {
        self.send(ListInput::Page(displayed))
    }

    /// # Errors
    ///
    /// Returns `ViewClosed` if the controller task has stopped.
    pub fn set_sort(&self, sort_key: Option<String>) -> Result<(), ViewClosed> {
        self.send(ListInput::Sort(sort_key))
    }

    /// # Errors
    ///
    /// Returns `ViewClosed` if the controller task has stopped.
    pub fn set_filter(&self, filter: Option<String>) -> Result<(), ViewClosed> {
        self.send(ListInput::Filter(filter))
    }

    /// Update the search text; the fetch is debounced.
    ///
    /// # Errors
    ///
    /// Returns `ViewClosed` if the controller task has stopped.
    pub fn set_search(&self, text: impl Into<String>) -> Result<(), ViewClosed> {
        self.send(ListInput::Search(text.into()))
    }

    /// # Errors
    ///
    /// Returns `ViewClosed` if the controller task has stopped.
    pub fn refresh(&self) -> Result<(), ViewClosed> {
        self.send(ListInput::Refresh)
    }

    /// Latest published view.
    #[must_use]
    pub fn snapshot(&self) -> ListView<T> {
        self.view.borrow().clone()
    }

    /// Subscribe to view updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListView<T>> {
        self.view.clone()
    }
}

/// Result of one fetch, tagged with the generation that issued it.
struct Completion<T> {
    generation: u64,
    /// Query as it stood when the fetch was issued.
    query: ListQuery,
    result: Result<Page<T>, ApiError>,
    /// Released once the response has been handled.
    _loading: LoadingGuard,
}

struct Worker<S: ListSource> {
    source: Arc<S>,
    settings: ListSettings,
    loading: LoadingTracker,
    query: ListQuery,
    generation: u64,
    view: watch::Sender<ListView<S::Item>>,
    completions_tx: mpsc::UnboundedSender<Completion<S::Item>>,
}

impl<S: ListSource> Worker<S> {
    async fn run(
        mut self,
        mut inputs: mpsc::UnboundedReceiver<ListInput>,
        mut completions: mpsc::UnboundedReceiver<Completion<S::Item>>,
    ) {
        let mut search_deadline: Option<Instant> = None;
        self.issue();

        loop {
            tokio::select! {
                input = inputs.recv() => {
                    let Some(input) = input else { break };
                    search_deadline = self.apply(input);
                }
                Some(done) = completions.recv() => self.settle(done),
                () = sleep_until(search_deadline.unwrap_or_else(Instant::now)),
                    if search_deadline.is_some() =>
                {
                    search_deadline = None;
                    self.issue();
                }
            }
        }
        debug!("List controller stopped");
    }

    /// Apply an input and return the new search deadline.
    fn apply(&mut self, input: ListInput) -> Option<Instant> {
        match input {
            ListInput::Search(text) => {
                self.query.set_search(&text);
                return Some(Instant::now() + self.settings.search_debounce);
            }
            ListInput::Page(displayed) => self.query.select_page(displayed),
            ListInput::Sort(sort_key) => self.query.set_sort(sort_key),
            ListInput::Filter(filter) => self.query.set_filter(filter),
            ListInput::Refresh => {}
        }
        self.issue();
        None
    }

    fn issue(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let request = self.query.request(self.settings.page_size);
        debug!(generation, ?request, "Fetching list page");

        let query = self.query.clone();
        let guard = self.loading.begin();
        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch(request).await;
            // The worker may be gone; the response is then simply dropped.
            let _ = completions.send(Completion {
                generation,
                query,
                result,
                _loading: guard,
            });
        });
    }

    fn settle(&self, done: Completion<S::Item>) {
        if done.generation != self.generation {
            debug!(
                generation = done.generation,
                latest = self.generation,
                "Discarding stale list response"
            );
            return;
        }
        match done.result {
            Ok(page) => {
                let query = done.query;
                self.view.send_modify(|view| {
                    view.displayed_page = page.displayed_page();
                    view.total_pages = page.total_pages;
                    view.items = page.items;
                    view.loaded = true;
                    view.settled = true;
                    view.query = query;
                    view.generation = done.generation;
                });
            }
            // The API client has already shown the error toast.
            Err(e) => {
                warn!(error = %e, "List fetch failed");
                self.view.send_if_modified(|view| !std::mem::replace(&mut view.settled, true));
            }
        }
    }
}
