//! Field-level validation errors for catalog drafts.
//!
//! Drafts are validated before anything is sent to the API. Each failing field
//! carries one message, keyed by the form field name so templates can render
//! the message next to the input.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Message used when a required text field is blank.
pub const REQUIRED_FIELD: &str = "This field is required";

/// Collection of field errors produced by a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("invalid fields: {}", self.fields().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the failing fields, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Convert into a `Result`, failing when any field has an error.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Validate that a text field is not blank.
pub fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED_FIELD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
    }

    #[test]
    fn test_require_text_rejects_whitespace() {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", "   ");
        assert_eq!(errors.get("name"), Some(REQUIRED_FIELD));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("price", "bad");
        errors.add("name", "bad");
        assert_eq!(errors.to_string(), "invalid fields: name, price");
    }
}
