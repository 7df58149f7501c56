//! HTTP route handlers for the console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /                            - Redirect to /shops
//!
//! # Shops
//! GET  /shops                       - Shop list (live view)
//! GET  /shops/new                   - Create form
//! POST /shops                       - Create shop
//! GET  /shops/{id}                  - Shop detail with its products
//! GET  /shops/{id}/edit             - Edit form
//! POST /shops/{id}                  - Update shop
//! POST /shops/{id}/delete           - Delete shop
//!
//! # Products and categories
//! Same layout under /products and /categories
//!
//! # Live list views
//! POST   /live/{view}/search        - Change search text (debounced)
//! POST   /live/{view}/sort          - Change sort key
//! POST   /live/{view}/filter        - Change filter
//! POST   /live/{view}/page          - Select a 1-based page
//! POST   /live/{view}/refresh       - Re-fetch the current page
//! GET    /live/{view}/events        - SSE stream of rendered list fragments
//! DELETE /live/{view}               - Unmount
//!
//! # Toasts and loading indicator
//! GET  /events                      - SSE stream of toast and loading changes
//! POST /toasts/dismiss              - Close or click away from a toast
//! ```

use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::list::{ListController, ListQuery, ListSettings, ListSource, ListView};
use crate::live::LiveList;
use crate::state::AppState;

pub mod categories;
pub mod events;
pub mod forms;
pub mod live;
pub mod products;
pub mod shops;

/// Page size used to fill select boxes (shops, categories).
pub(crate) const CHOICES_PAGE_SIZE: u32 = 100;

/// Query string of list pages, so a list can be linked in a given state.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u32>,
}

impl ListParams {
    /// Initial query for a list page, on top of a fixed filter.
    #[must_use]
    pub fn into_query(self, filter: Option<String>) -> ListQuery {
        let mut query = ListQuery::filtered(filter);
        query.set_sort(self.sort);
        if let Some(search) = self.search {
            query.set_search(&search);
        }
        if let Some(page) = self.page {
            query.select_page(page);
        }
        query
    }
}

/// Build the console router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(|| async { Redirect::to("/shops") }))
        .merge(shops::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(live::router())
        .merge(events::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog API.
async fn health() -> &'static str {
    "ok"
}

/// Render a template, logging failures.
pub(crate) fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Mount a list controller for a page and wait briefly for its first page.
///
/// Returns the view id and the state to render server-side. The first page
/// is awaited up to the API timeout, so pages normally arrive populated and
/// the event stream only carries later changes.
pub(crate) async fn mount_list<S>(
    state: &AppState,
    source: &Arc<S>,
    query: ListQuery,
    wrap: fn(ListController<S::Item>) -> LiveList,
) -> (Uuid, ListView<S::Item>)
where
    S: ListSource,
{
    mount_list_with(state, state.list_settings(), source, query, wrap).await
}

/// [`mount_list`] with its own page size or debounce.
pub(crate) async fn mount_list_with<S>(
    state: &AppState,
    settings: ListSettings,
    source: &Arc<S>,
    query: ListQuery,
    wrap: fn(ListController<S::Item>) -> LiveList,
) -> (Uuid, ListView<S::Item>)
where
    S: ListSource,
{
    let controller = ListController::spawn(
        Arc::clone(source),
        settings,
        state.loading().clone(),
        query,
    );
    let mut rx = controller.subscribe();
    let view_id = state.live().mount(wrap(controller));

    let wait: Duration = state.config().api.timeout;
    let settled = tokio::time::timeout(wait, rx.wait_for(|v| v.settled))
        .await
        .is_ok_and(|r| r.is_ok());
    if !settled {
        tracing::warn!(%view_id, "First list page did not arrive in time");
    }
    let view = rx.borrow().clone();
    (view_id, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_page_survives_search() {
        let query = ListParams {
            search: Some("pain".to_string()),
            sort: Some(String::new()),
            page: Some(3),
        }
        .into_query(Some("&shopId=2".to_string()));
        assert_eq!(query.page_index, 2);
        assert_eq!(query.sort_key, None);
        assert_eq!(query.search.as_deref(), Some("pain"));
        assert_eq!(query.filter.as_deref(), Some("&shopId=2"));
    }
}
