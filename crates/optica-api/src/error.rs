//! # API Error Types
//!
//! Failures of the Fetch and Submit collaborators and of configuration
//! loading.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        API Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │   Response      │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Network        │  │  Status         │  │  Config                 │ │
//! │  │                 │  │  Rejected       │  │                         │ │
//! │  │                 │  │  Malformed      │  │                         │ │
//! │  │                 │  │  Decode         │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  None of these is fatal: the screen keeps its previous snapshot and    │
//! │  shows notification_message() as a transient alert.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use optica_core::CoreError;
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response (DNS, refused, timeout).
    #[error("Network error: {0}")]
    Network(String),

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// Non-2xx response. `message` is the backend's `message` field when it
    /// sent one.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response carrying `{"success": false, "message": ...}`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Body is JSON but neither a bare array nor a `{data: [...]}` envelope.
    #[error("Unexpected response shape: {0}")]
    MalformedEnvelope(String),

    /// Body is not valid JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The submit payload could not be turned into a request body.
    #[error("Invalid request body: {0}")]
    Payload(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Text shown to the operator in a transient notification.
    pub fn notification_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Connection error. Check your network connection.".to_string(),
            ApiError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Status { status: 401, .. } => "Not authorized. Please sign in.".to_string(),
            ApiError::Status { status: 403, .. } => "Access denied.".to_string(),
            ApiError::Status { status: 404, .. } => "Resource not found.".to_string(),
            ApiError::Status { status, .. } if *status >= 500 => {
                "Internal server error. Please try again later.".to_string()
            }
            ApiError::Status { status, .. } => format!("Request failed ({})", status),
            ApiError::Rejected(message) => message.clone(),
            ApiError::MalformedEnvelope(_) | ApiError::Decode(_) => {
                tracing::error!(error = %self, "unreadable backend response");
                "Invalid response from the server.".to_string()
            }
            ApiError::Payload(reason) => reason.clone(),
            ApiError::Config(reason) => reason.clone(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::Config(format!("invalid URL: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for ApiError {
    fn from(err: toml::de::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Payload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_prefers_backend_message() {
        let err = ApiError::Status {
            status: 400,
            message: "El DUI ya está registrado".into(),
        };
        assert_eq!(err.notification_message(), "El DUI ya está registrado");
    }

    #[test]
    fn test_notification_by_status() {
        let status = |status| ApiError::Status { status, message: String::new() };
        assert_eq!(status(404).notification_message(), "Resource not found.");
        assert_eq!(status(503).notification_message(), "Internal server error. Please try again later.");
        assert_eq!(status(409).notification_message(), "Request failed (409)");
        assert!(ApiError::Network("refused".into())
            .notification_message()
            .starts_with("Connection error"));
    }
}
