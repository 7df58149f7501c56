//! Toast and loading indicator endpoints.

use std::convert::Infallible;

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use futures::Stream;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::instrument;

use crate::notifications::{ActiveToast, DismissReason};
use crate::state::AppState;

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(events))
        .route("/toasts/dismiss", post(dismiss))
}

/// Toast view for templates.
#[derive(Debug, Clone)]
pub struct ToastView {
    pub id: u64,
    pub severity: &'static str,
    pub message: String,
}

impl From<&ActiveToast> for ToastView {
    fn from(active: &ActiveToast) -> Self {
        Self {
            id: active.id,
            severity: active.toast.severity.as_str(),
            message: active.toast.message.clone(),
        }
    }
}

/// Toast region fragment.
#[derive(Template)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub toast: Option<ToastView>,
}

/// Loading indicator fragment.
#[derive(Template)]
#[template(path = "partials/loading.html")]
pub struct LoadingTemplate {
    pub loading: bool,
}

/// Render the toast region for the current toast.
#[must_use]
pub fn render_toast(active: Option<&ActiveToast>) -> String {
    let template = ToastTemplate {
        toast: active.map(ToastView::from),
    };
    template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        String::new()
    })
}

/// Render the loading indicator.
#[must_use]
pub fn render_loading(loading: bool) -> String {
    LoadingTemplate { loading }.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        String::new()
    })
}

fn toast_event(rx: &mut watch::Receiver<Option<ActiveToast>>) -> Event {
    let active = rx.borrow_and_update().clone();
    Event::default()
        .event("toast")
        .data(render_toast(active.as_ref()))
}

fn loading_event(rx: &mut watch::Receiver<bool>) -> Event {
    let loading = *rx.borrow_and_update();
    Event::default()
        .event("loading")
        .data(render_loading(loading))
}

enum Change {
    Toast,
    Loading,
    Closed,
}

/// Stream toast and loading indicator changes to the layout.
///
/// The current state of both is sent on connect.
#[instrument(skip(state))]
async fn events(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut toasts = state.notifier().subscribe();
    let mut loading = state.loading().subscribe();

    let stream = async_stream::stream! {
        yield Ok(toast_event(&mut toasts));
        yield Ok(loading_event(&mut loading));

        loop {
            let change = tokio::select! {
                r = toasts.changed() => if r.is_ok() { Change::Toast } else { Change::Closed },
                r = loading.changed() => if r.is_ok() { Change::Loading } else { Change::Closed },
            };
            let event = match change {
                Change::Toast => toast_event(&mut toasts),
                Change::Loading => loading_event(&mut loading),
                Change::Closed => break,
            };
            yield Ok(event);
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Dismissal request from the toast region.
#[derive(Debug, Deserialize)]
pub struct DismissForm {
    pub id: u64,
    pub reason: DismissReason,
}

/// Hide a toast. Click-away requests are accepted but have no effect.
#[instrument(skip(state))]
async fn dismiss(State(state): State<AppState>, Form(form): Form<DismissForm>) -> StatusCode {
    let hidden = state.notifier().dismiss(form.id, form.reason);
    tracing::debug!(toast_id = form.id, hidden, "Toast dismissal");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use shop_console_core::Toast;

    use super::*;

    #[test]
    fn test_toast_fragment_escapes_message() {
        let active = ActiveToast {
            id: 7,
            toast: Toast::error("<b>Nom déjà utilisé</b>"),
        };
        let html = render_toast(Some(&active));
        assert!(html.contains("toast-error"));
        assert!(html.contains("&#60;b&#62;Nom déjà utilisé&#60;/b&#62;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_empty_toast_region_renders_nothing_visible() {
        assert!(!render_toast(None).contains("role=\"alert\""));
    }

    #[test]
    fn test_loading_indicator_toggles() {
        assert!(render_loading(true).contains("Loading"));
        assert!(!render_loading(false).contains("Loading"));
    }
}
