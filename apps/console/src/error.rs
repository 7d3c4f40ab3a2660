//! # Console Error Type
//!
//! Every failure a command can hit, flattened into a machine-readable
//! `code` and the message shown to the operator.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  optica_api::ApiError  ──┐                                              │
//! │                          ├──► ConsoleError { code, message } ──► stderr │
//! │  optica_core::CoreError ─┘        text:  [NOT_FOUND] Resource not found │
//! │                                   json:  {"code":"NOT_FOUND",...}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use optica_api::ApiError;
use optica_core::CoreError;
use serde::Serialize;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad input (form values, sort field, page size)
    ValidationError,

    /// Backend unreachable or timed out
    NetworkError,

    /// Backend answered 404
    NotFound,

    /// Backend answered 401/403
    Unauthorized,

    /// Backend refused or failed the request
    BackendError,

    /// Backend answered something we cannot read
    InvalidResponse,

    /// Console configuration is invalid
    ConfigError,

    /// Anything else
    Internal,
}

impl ConsoleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ConsoleError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::Internal, message)
    }
}

/// Converts REST errors; the message is the user-facing notification text.
impl From<ApiError> for ConsoleError {
    fn from(err: ApiError) -> Self {
        let message = err.notification_message();
        let code = match &err {
            ApiError::Network(_) => ErrorCode::NetworkError,
            ApiError::Status { status: 404, .. } => ErrorCode::NotFound,
            ApiError::Status { status: 401 | 403, .. } => ErrorCode::Unauthorized,
            ApiError::Status { .. } | ApiError::Rejected(_) => ErrorCode::BackendError,
            ApiError::MalformedEnvelope(_) | ApiError::Decode(_) => ErrorCode::InvalidResponse,
            ApiError::Config(_) => ErrorCode::ConfigError,
            ApiError::Payload(reason) => {
                tracing::error!("Payload could not be sent: {}", reason);
                ErrorCode::Internal
            }
        };
        ConsoleError::new(code, message)
    }
}

/// Converts core errors.
impl From<CoreError> for ConsoleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => {
                let fields: Vec<String> = errors
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect();
                ConsoleError::validation(fields.join("; "))
            }
            CoreError::InvalidSortField { .. } | CoreError::InvalidPageSize(_) => {
                ConsoleError::validation(err.to_string())
            }
            CoreError::SubmissionInFlight => ConsoleError::new(ErrorCode::BackendError, err.to_string()),
            CoreError::Payload { reason } => {
                tracing::error!("Payload could not be built: {}", reason);
                ConsoleError::internal("Could not prepare the request")
            }
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON output failed: {}", err);
        ConsoleError::internal("Could not render JSON output")
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = serde_json::to_value(self.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.code));
        write!(f, "[{}] {}", code, self.message)
    }
}

impl std::error::Error for ConsoleError {}

// =============================================================================
// Unit Tests
// =============================================================================
