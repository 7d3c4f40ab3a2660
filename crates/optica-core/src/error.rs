//! # Error Types
//!
//! Domain-specific error types for optica-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  optica-core errors (this file)                                        │
//! │  ├── CoreError        - Screen/form operation failures                 │
//! │  └── ValidationError  - One failed field rule                          │
//! │                                                                         │
//! │  optica-api errors (separate crate)                                    │
//! │  └── ApiError         - Fetch/submit failures                          │
//! │                                                                         │
//! │  Console errors (in app)                                               │
//! │  └── ConsoleError     - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → ErrorMap → CoreError → ConsoleError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal: a validation failure stays inline on its field,
//! a fetch failure becomes a transient notification.

use thiserror::Error;

use crate::validation::ErrorMap;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by screen and form operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The form has at least one field error; submission is blocked.
    #[error("{} field(s) failed validation", .0.len())]
    Validation(ErrorMap),

    /// A create/update/delete is already in flight for this screen.
    ///
    /// ## When This Occurs
    /// ```text
    /// Submit (click)  ──► SubmitStarted  ──► request in flight
    /// Submit (click)  ──► SubmitStarted  ──► SubmissionInFlight ❌
    /// response        ──► SubmitFinished ──► ready again
    /// ```
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// Sort field name is not sortable on this screen.
    #[error("Cannot sort by '{field}'")]
    InvalidSortField { field: String },

    /// Page size must be at least 1.
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// The submit payload could not be built.
    #[error("Cannot build payload: {reason}")]
    Payload { reason: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single failed field rule.
///
/// Rendered into an [`ErrorMap`] keyed by [`ValidationError::field`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (DUI, phone, e-mail, document id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value must be strictly below another field's value.
    #[error("{field} must be less than {other}")]
    MustBeLessThan { field: String, other: String },

    /// Date must be strictly after another field's date.
    #[error("{field} must be after {other}")]
    MustBeAfter { field: String, other: String },

    /// A list field needs at least one entry.
    #[error("{field} needs at least one {item}")]
    Empty { field: String, item: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// The field path this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::MustBeLessThan { field, .. }
            | ValidationError::MustBeAfter { field, .. }
            | ValidationError::Empty { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
