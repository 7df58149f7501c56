//! Live list view endpoints.
//!
//! Toolbar and pagination controls post here with `hx-swap="none"`; the new
//! list arrives through the view's event stream.

use std::convert::Infallible;

use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::{delete, get, post},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use shop_console_core::{Category, CategoryId, Product, Shop, ShopId};
use tokio::sync::watch;
use tracing::instrument;
use uuid::Uuid;

use super::forms::parse_optional;
use super::{categories, products, shops};
use crate::error::AppError;
use crate::list::{ListInput, ListView};
use crate::live::{ListKind, LiveList, MountGuard};
use crate::services::{ProductFilter, ShopFilter};
use crate::state::AppState;

/// Build the live view router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/live/{view}", delete(unmount))
        .route("/live/{view}/events", get(events))
        .route("/live/{view}/search", post(search))
        .route("/live/{view}/sort", post(sort))
        .route("/live/{view}/filter", post(filter))
        .route("/live/{view}/page", post(page))
        .route("/live/{view}/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct SortForm {
    #[serde(default)]
    pub sort: String,
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub page: u32,
}

/// Filter toolbar. Which fields apply depends on the list.
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub in_vacations: Option<String>,
    #[serde(default)]
    pub created_after: Option<String>,
    #[serde(default)]
    pub created_before: Option<String>,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
}

impl FilterForm {
    /// Filter expression for a list of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for unparsable values or lists that
    /// cannot be filtered.
    pub fn expression(&self, kind: ListKind) -> Result<Option<String>, AppError> {
        match kind {
            ListKind::Shops => Ok(ShopFilter {
                in_vacations: parse_optional(self.in_vacations.as_deref(), "in_vacations")?,
                created_after: parse_optional(self.created_after.as_deref(), "created_after")?,
                created_before: parse_optional(self.created_before.as_deref(), "created_before")?,
            }
            .expression()),
            ListKind::Products => Ok(ProductFilter {
                shop_id: parse_optional::<ShopId>(self.shop_id.as_deref(), "shop_id")?,
                category_id: parse_optional::<CategoryId>(self.category_id.as_deref(), "category_id")?,
            }
            .expression()),
            ListKind::Categories => Err(AppError::BadRequest(
                "categories have no filters".to_string(),
            )),
        }
    }
}

/// Forward an input to a mounted view.
fn forward(state: &AppState, view_id: Uuid, input: ListInput) -> Result<StatusCode, AppError> {
    if state.live().send(view_id, input) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("list view {view_id}")))
    }
}

#[instrument(skip(state))]
async fn search(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Form(form): Form<SearchForm>,
) -> Result<StatusCode, AppError> {
    forward(&state, view_id, ListInput::Search(form.search))
}

#[instrument(skip(state))]
async fn sort(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Form(form): Form<SortForm>,
) -> Result<StatusCode, AppError> {
    forward(&state, view_id, ListInput::Sort(Some(form.sort)))
}

#[instrument(skip(state))]
async fn filter(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Form(form): Form<FilterForm>,
) -> Result<StatusCode, AppError> {
    let kind = state
        .live()
        .with(view_id, LiveList::kind)
        .ok_or_else(|| AppError::NotFound(format!("list view {view_id}")))?;
    let expression = form.expression(kind)?;
    forward(&state, view_id, ListInput::Filter(expression))
}

#[instrument(skip(state))]
async fn page(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Form(form): Form<PageForm>,
) -> Result<StatusCode, AppError> {
    forward(&state, view_id, ListInput::Page(form.page))
}

#[instrument(skip(state))]
async fn refresh(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    forward(&state, view_id, ListInput::Refresh)
}

#[instrument(skip(state))]
async fn unmount(State(state): State<AppState>, Path(view_id): Path<Uuid>) -> StatusCode {
    if state.live().unmount(view_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Typed view subscription of a mounted list.
enum Subscription {
    Shops(watch::Receiver<ListView<Shop>>),
    Products(watch::Receiver<ListView<Product>>),
    Categories(watch::Receiver<ListView<Category>>),
}

/// Stream rendered list fragments for a mounted view.
///
/// The view is unmounted when the client disconnects.
#[instrument(skip(state))]
async fn events(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let subscription = state
        .live()
        .attach(view_id, |list| match list {
            LiveList::Shops(c) => Subscription::Shops(c.subscribe()),
            LiveList::Products(c) => Subscription::Products(c.subscribe()),
            LiveList::Categories(c) => Subscription::Categories(c.subscribe()),
        })
        .ok_or_else(|| AppError::NotFound(format!("list view {view_id}")))?;

    let guard = MountGuard::new(state.live().clone(), view_id);
    let stream = match subscription {
        Subscription::Shops(rx) => {
            fragment_stream(rx, guard, move |v| shops::render_list(view_id, v)).boxed()
        }
        Subscription::Products(rx) => {
            fragment_stream(rx, guard, move |v| products::render_list(view_id, v)).boxed()
        }
        Subscription::Categories(rx) => {
            fragment_stream(rx, guard, move |v| categories::render_list(view_id, v)).boxed()
        }
    };

    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response())
}

/// Emit the current fragment, then one per view change, until the view stops.
fn fragment_stream<T, F>(
    mut rx: watch::Receiver<ListView<T>>,
    guard: MountGuard,
    render: F,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&ListView<T>) -> String + Send + 'static,
{
    async_stream::stream! {
        let _guard = guard;
        loop {
            let html = {
                let view = rx.borrow_and_update();
                render(&view)
            };
            yield Ok(Event::default().event("list").data(html));
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_filter_form_builds_expression() {
        let form = FilterForm {
            in_vacations: Some("true".to_string()),
            created_after: Some("2024-01-01".to_string()),
            ..FilterForm::default()
        };
        assert_eq!(
            form.expression(ListKind::Shops).unwrap().as_deref(),
            Some("&inVacations=true&createdAfter=2024-01-01")
        );
    }

    #[test]
    fn test_blank_filter_form_clears_filter() {
        let form = FilterForm {
            in_vacations: Some(String::new()),
            ..FilterForm::default()
        };
        assert_eq!(form.expression(ListKind::Shops).unwrap(), None);
    }

    #[test]
    fn test_product_filter_form_uses_ids() {
        let form = FilterForm {
            shop_id: Some("4".to_string()),
            category_id: Some("2".to_string()),
            ..FilterForm::default()
        };
        assert_eq!(
            form.expression(ListKind::Products).unwrap().as_deref(),
            Some("&shopId=4&categoryId=2")
        );
    }

    #[test]
    fn test_invalid_filter_values_are_rejected() {
        let form = FilterForm {
            created_before: Some("yesterday".to_string()),
            ..FilterForm::default()
        };
        assert!(matches!(
            form.expression(ListKind::Shops),
            Err(AppError::BadRequest(_))
        ));
        assert!(form.expression(ListKind::Categories).is_err());
    }
}
