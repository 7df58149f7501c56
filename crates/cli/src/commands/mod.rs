//! Command implementations.
//!
//! Every command talks to the catalog API through the console's services and
//! prints its result as pretty JSON on stdout.

use std::io::Write;

use serde::Serialize;
use shop_console_admin::api::{ApiClient, ApiError};
use shop_console_admin::config::{ApiConfig, ConfigError};
use shop_console_admin::list::{ListQuery, ListRequest};
use shop_console_admin::loading::LoadingTracker;
use shop_console_admin::notifications::Notifier;
use shop_console_admin::services::{CategoryService, ProductService, ShopService};
use shop_console_core::ValidationErrors;
use thiserror::Error;

use crate::ListArgs;

pub mod categories;
pub mod products;
pub mod shops;

/// Toasts are never shown by the CLI; failures are returned as errors.
const UNUSED_TOAST_DURATION: std::time::Duration = std::time::Duration::from_secs(1);

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or invalid API origin.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input rejected before reaching the API.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Writing the result failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Services bound to one API origin.
pub struct Context {
    pub shops: ShopService,
    pub products: ProductService,
    pub categories: CategoryService,
}

impl Context {
    /// Build the services for `api_url`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` when no origin is given or it is invalid.
    pub fn connect(api_url: Option<&str>) -> Result<Self, CliError> {
        let api_url =
            api_url.ok_or_else(|| ConfigError::MissingEnvVar("CATALOG_API_URL".to_string()))?;
        let config = ApiConfig::new(api_url)?;
        let client = ApiClient::new(
            &config,
            Notifier::new(UNUSED_TOAST_DURATION),
            LoadingTracker::new(),
        )?;
        tracing::debug!(api = %client.base_url(), "Connected");

        Ok(Self {
            shops: ShopService::new(client.clone()),
            products: ProductService::new(client.clone()),
            categories: CategoryService::new(client),
        })
    }
}

/// Resolve list arguments and a fixed filter into one request, with the same
/// precedence as the console's lists.
#[must_use]
pub fn list_request(args: &ListArgs, filter: Option<String>) -> ListRequest {
    let mut query = ListQuery::filtered(filter);
    query.set_sort(args.sort.clone());
    if let Some(search) = &args.search {
        query.set_search(search);
    }
    query.select_page(args.page);
    query.request(args.size)
}

/// Print a value as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use shop_console_admin::list::ListStrategy;

    use super::*;

    fn args(sort: Option<&str>, search: Option<&str>) -> ListArgs {
        ListArgs {
            page: 2,
            size: 5,
            sort: sort.map(str::to_string),
            search: search.map(str::to_string),
        }
    }

    #[test]
    fn test_page_is_kept_after_search() {
        let request = list_request(&args(None, Some("pain")), None);
        assert_eq!(request.page_index, 1);
        assert_eq!(request.page_size, 5);
        assert_eq!(
            request.strategy,
            ListStrategy::Filtered {
                expression: "&name=pain".to_string()
            }
        );
    }

    #[test]
    fn test_sort_drops_filter() {
        let request = list_request(&args(Some("name"), None), Some("&shopId=3".to_string()));
        assert_eq!(
            request.strategy,
            ListStrategy::Sorted {
                sort_key: "name".to_string(),
                search: None
            }
        );
    }

    #[test]
    fn test_missing_api_url_is_a_config_error() {
        assert!(matches!(Context::connect(None), Err(CliError::Config(_))));
    }
}
