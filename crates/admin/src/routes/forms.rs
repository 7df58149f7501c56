//! Helpers for form bodies with repeated fields.
//!
//! `axum::Form` cannot collect repeated keys (opening-hours rows, category
//! checkboxes), so those forms are read raw and decoded with
//! `url::form_urlencoded`.

use std::str::FromStr;

use crate::error::AppError;

/// Decoded `application/x-www-form-urlencoded` body, keeping key order.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    /// Decode a raw form body.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value of `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value of `key`, or the empty string.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.first(key).unwrap_or_default().trim().to_string()
    }

    /// Every value of `key`, in submission order.
    #[must_use]
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether a checkbox named `key` was ticked.
    #[must_use]
    pub fn checked(&self, key: &str) -> bool {
        self.first(key)
            .is_some_and(|v| matches!(v, "on" | "true" | "1"))
    }
}

/// Parse an optional form value, treating blank as absent.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming `field` if the value does not parse.
pub fn parse_optional<T: FromStr>(raw: Option<&str>, field: &str) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("invalid value for {field}: {value}"))),
    }
}
