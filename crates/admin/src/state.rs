//! Application state shared across handlers.
//!
//! Everything a handler needs is reached through [`AppState`]: the catalog
//! services, the toast notifier, the loading tracker and the registry of
//! mounted list views. Tests build their own state against a fake API.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::AdminConfig;
use crate::list::ListSettings;
use crate::live::LiveViews;
use crate::loading::LoadingTracker;
use crate::notifications::Notifier;
use crate::services::{CategoryService, ProductService, ShopService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    shops: Arc<ShopService>,
    products: Arc<ProductService>,
    categories: Arc<CategoryService>,
    notifier: Notifier,
    loading: LoadingTracker,
    live: LiveViews,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("live", &self.inner.live)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state and its API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let notifier = Notifier::new(config.ui.toast_duration);
        let loading = LoadingTracker::new();
        let api = ApiClient::new(&config.api, notifier.clone(), loading.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                shops: Arc::new(ShopService::new(api.clone())),
                products: Arc::new(ProductService::new(api.clone())),
                categories: Arc::new(CategoryService::new(api.clone())),
                api,
                config,
                notifier,
                loading,
                live: LiveViews::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn shops(&self) -> &Arc<ShopService> {
        &self.inner.shops
    }

    #[must_use]
    pub fn products(&self) -> &Arc<ProductService> {
        &self.inner.products
    }

    #[must_use]
    pub fn categories(&self) -> &Arc<CategoryService> {
        &self.inner.categories
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn loading(&self) -> &LoadingTracker {
        &self.inner.loading
    }

    #[must_use]
    pub fn live(&self) -> &LiveViews {
        &self.inner.live
    }

    /// Page size and debounce for list views.
    #[must_use]
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            page_size: self.inner.config.ui.page_size,
            search_debounce: self.inner.config.ui.search_debounce,
        }
    }
}
