//! Catalog REST API access.
//!
//! [`ApiClient`] owns the HTTP connection pool and the base URL. Every
//! failed remote call is reported to the [`Notifier`](crate::notifications::Notifier)
//! as an error toast before the error is handed back to the caller, so
//! callers never need to notify on their own.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ErrorBody, GENERIC_ERROR_MESSAGE};
