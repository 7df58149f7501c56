//! Catalog API error types.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Fallback toast text when a failure carries nothing readable.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Body of a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// Structured JSON payload.
    Json(Value),
    /// Anything that did not parse as JSON.
    Text(String),
}

impl ErrorBody {
    /// Classify a raw response body. Blank bodies yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(
            serde_json::from_str::<Value>(raw)
                .map_or_else(|_| Self::Text(raw.to_string()), Self::Json),
        )
    }

    /// The body as display text: strings verbatim, other JSON serialized.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) | Self::Json(Value::String(text)) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }

    /// The `message` field of a JSON object body, if any.
    #[must_use]
    pub fn message_field(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.get("message").and_then(Value::as_str),
            Self::Text(_) => None,
        }
    }
}

/// Errors returned by catalog API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout).
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered 404.
    #[error("Not found: {path}")]
    NotFound {
        path: String,
        body: Option<ErrorBody>,
    },

    /// The server answered with another non-success status.
    #[error("Request failed with status code {}", .status.as_u16())]
    Status {
        status: StatusCode,
        body: Option<ErrorBody>,
    },

    /// A success response did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The call was rejected locally before any request was made.
    #[error("{0}")]
    InvalidArgument(String),
}

impl ApiError {
    /// Build the error for a non-success response.
    #[must_use]
    pub fn from_status(status: StatusCode, path: &str, raw_body: &str) -> Self {
        let body = ErrorBody::parse(raw_body);
        if status == StatusCode::NOT_FOUND {
            Self::NotFound {
                path: path.to_string(),
                body,
            }
        } else {
            Self::Status { status, body }
        }
    }

    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body of the failed response, if there was one.
    #[must_use]
    pub const fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::NotFound { body, .. } | Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Text shown in the error toast.
    ///
    /// The response body wins when present (verbatim when textual, serialized
    /// otherwise), then the error's own message, then a generic fallback.
    #[must_use]
    pub fn toast_message(&self) -> String {
        if let Some(body) = self.body() {
            let text = body.to_text();
            if !text.trim().is_empty() {
                return text;
            }
        }
        let own = self.to_string();
        if own.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            own
        }
    }

    /// Short message suitable for an inline form banner.
    ///
    /// Prefers the `message` field of a JSON body over the full toast text.
    #[must_use]
    pub fn form_message(&self) -> String {
        self.body()
            .and_then(ErrorBody::message_field)
            .map_or_else(|| self.toast_message(), str::to_string)
    }
}
