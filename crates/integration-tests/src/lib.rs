//! Integration test support for the shop console.
//!
//! [`FakeApi`] serves a scripted catalog API on an ephemeral local port and
//! records every request it receives, so tests can drive the real console
//! services and router against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-console-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::IntoResponse,
};
use serde_json::{Value, json};
use shop_console_admin::config::AdminConfig;
use shop_console_admin::state::AppState;
use shop_console_core::{Page, PageEnvelope};
use tokio::task::JoinHandle;

/// One request received by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    /// Path and query, e.g. `/shops?page=0&size=9`.
    pub target: String,
    pub body: String,
}

impl Recorded {
    /// Path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }
}

/// Scripted reply: status and JSON (or plain text) body.
pub type Reply = (StatusCode, String);

type Responder = dyn Fn(&Recorded) -> Reply + Send + Sync;

#[derive(Clone)]
struct Shared {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Arc<Responder>,
}

/// In-process stand-in for the catalog REST API.
pub struct FakeApi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Serve `responder` on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(responder: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
        let shared = Shared {
            requests: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        };
        let requests = Arc::clone(&shared.requests);

        let app = Router::new().fallback(answer).with_state(shared);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API");
        let addr = listener.local_addr().expect("Fake API has no address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            requests,
            server,
        }
    }

    /// Base URL to configure the console with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Console configuration pointing at this API, with short timings.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    pub fn config(&self) -> AdminConfig {
        let base_url = self.base_url();
        AdminConfig::from_lookup(|key| match key {
            "CATALOG_API_URL" => Some(base_url.clone()),
            "SEARCH_DEBOUNCE_MS" => Some("20".to_string()),
            "TOAST_DURATION_MS" => Some("5000".to_string()),
            "API_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("Fake API configuration is valid")
    }

    /// Console state wired to this API.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built.
    #[must_use]
    pub fn state(&self) -> AppState {
        AppState::new(self.config()).expect("Failed to build state")
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn answer(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    let recorded = Recorded {
        method,
        target: uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let (status, body) = (shared.responder)(&recorded);
    shared
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    let content_type = if serde_json::from_str::<Value>(&body).is_ok() {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    };
    (status, [(header::CONTENT_TYPE, content_type)], body)
}

// =============================================================================
// Fixtures
// =============================================================================

/// Page envelope as the API sends it.
#[must_use]
pub fn page_json(content: &[Value], page_index: u32, size: u32) -> String {
    let total = u64::try_from(content.len()).unwrap_or(u64::MAX);
    let page = Page::new(content.to_vec(), total, page_index, size);
    serde_json::to_string(&PageEnvelope::from(page)).unwrap_or_default()
}

/// A shop resource.
#[must_use]
pub fn shop_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "createdAt": "2024-03-01",
        "inVacations": false,
        "nbProducts": 2,
        "openingHours": [
            { "id": 1, "day": 1, "openAt": "09:00:00", "closeAt": "18:00:00" }
        ],
    })
}

/// A category resource.
#[must_use]
pub fn category_json(id: i64, name: &str) -> Value {
    json!({ "id": id, "name": name })
}

/// A product resource with a French name.
#[must_use]
pub fn product_json(id: i64, name: &str, shop_id: i64) -> Value {
    json!({
        "id": id,
        "price": 3.5,
        "localizedProducts": [{ "locale": "FR", "name": name, "description": "" }],
        "shop": { "id": shop_id, "name": "Chez Paul" },
        "categories": [],
    })
}
