//! HTTP client for the catalog REST API.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::loading::LoadingTracker;
use crate::notifications::Notifier;

/// Shared catalog API client.
///
/// Cheap to clone. All clones share one connection pool, one notifier and one
/// loading tracker. Every request counts as loading until its body is read.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: Client,
    base_url: String,
    notifier: Notifier,
    loading: LoadingTracker,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(
        config: &ApiConfig,
        notifier: Notifier,
        loading: LoadingTracker,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                notifier,
                loading,
            }),
        })
    }

    /// Base URL every path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Notifier failures are reported to.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Tracker every outstanding request is counted in.
    #[must_use]
    pub fn loading(&self) -> &LoadingTracker {
        &self.inner.loading
    }

    /// Full URL for a resource path (which may carry a query string).
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or an
    /// undecodable body.
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path);
        let _loading = self.inner.loading.begin();
        self.report(async { decode(self.send(path, request).await?).await }.await)
    }

    /// POST a JSON body to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or an
    /// undecodable body.
    #[instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        let _loading = self.inner.loading.begin();
        self.report(async { decode(self.send(path, request).await?).await }.await)
    }

    /// PUT a JSON body to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or an
    /// undecodable body.
    #[instrument(skip(self, body))]
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path).json(body);
        let _loading = self.inner.loading.begin();
        self.report(async { decode(self.send(path, request).await?).await }.await)
    }

    /// DELETE `path`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-success status.
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path);
        let _loading = self.inner.loading.begin();
        self.report(self.send(path, request).await.map(|_| ()))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.http.request(method, self.endpoint(path))
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "Catalog API response");

        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, path, &raw))
    }

    /// Emit an error toast for a failed call, then pass the result through.
    fn report<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(error) = &result {
            warn!(error = %error, "Catalog API call failed");
            self.inner.notifier.error(error.toast_message());
        }
        result
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let raw = response.text().await.map_err(ApiError::Transport)?;
    serde_json::from_str(&raw).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = ApiConfig::new(base).unwrap();
        ApiClient::new(
            &config,
            Notifier::new(Duration::from_secs(5)),
            LoadingTracker::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_with_single_slash() {
        let api = client("http://localhost:8080/api/v1/");
        assert_eq!(
            api.endpoint("shops?page=0&size=9"),
            "http://localhost:8080/api/v1/shops?page=0&size=9"
        );
        assert_eq!(api.endpoint("/shops/3"), "http://localhost:8080/api/v1/shops/3");
    }

    #[tokio::test]
    async fn test_unreachable_server_emits_error_toast() {
        let api = client("http://127.0.0.1:9");
        let result: Result<serde_json::Value, _> = api.get_json("shops").await;

        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        let toast = api.notifier().current().unwrap();
        assert_eq!(toast.toast.message, err.toast_message());
        assert!(!api.loading().is_loading());
    }

    #[tokio::test]
    async fn test_pending_request_holds_loading_flag() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let api = client(&format!("http://{addr}"));
        let request = tokio::spawn({
            let api = api.clone();
            async move { api.get_json::<serde_json::Value>("shops/1").await }
        });

        let mut flag = api.loading().subscribe();
        flag.wait_for(|loading| *loading).await.unwrap();
        assert_eq!(api.loading().in_flight(), 1);

        request.abort();
        let _ = request.await;
        assert!(!api.loading().is_loading());
        server.abort();
    }
}
