//! # Validation Module
//!
//! Form validation for the management screens.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Flow                                    │
//! │                                                                         │
//! │  FieldStore::set(path, v)                                              │
//! │  └── clears errors[path] only (no re-validation while typing)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Submit attempt                                                        │
//! │  └── FieldStore::validate(validator, mode)                             │
//! │        └── Validator::validate(values, mode) → ErrorMap                │
//! │              empty?  ── yes ──► build payload, submit                  │
//! │                      ── no  ──► errors shown inline, submit blocked    │
//! │                                                                         │
//! │  Backend constraints remain the final authority.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Screen validators are plain functions `(values, mode) -> ErrorMap`,
//! usually written with the [`Rules`] builder. Field formats shared across
//! screens (DUI, phone, e-mail, document id) live here.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::ValidationError;
use crate::field_store::FieldValues;
use crate::{MAX_PAGE_SIZE, MAX_SEARCH_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Error Map
// =============================================================================

/// Field path → message. Ordered by path so summaries are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
    pub fn new() -> Self {
        ErrorMap::default()
    }

    /// Records a message for `field`. The first message per field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn push(&mut self, error: ValidationError) {
        let message = error.to_string();
        self.insert(error.field().to_string(), message);
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.0.iter().next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// A screen's form rules. Total and deterministic: no I/O, no clock.
pub trait Validator {
    fn validate(&self, values: &FieldValues, mode: FormMode) -> ErrorMap;
}

impl<F> Validator for F
where
    F: Fn(&FieldValues, FormMode) -> ErrorMap,
{
    fn validate(&self, values: &FieldValues, mode: FormMode) -> ErrorMap {
        self(values, mode)
    }
}

// =============================================================================
// Rules Builder
// =============================================================================

/// Accumulates field errors against one snapshot.
///
/// ```rust
/// use optica_core::field_store::FieldValues;
/// use optica_core::validation::Rules;
/// use serde_json::json;
///
/// let values = FieldValues::from_value(json!({ "nombre": "", "edad": 130 }));
/// let errors = Rules::new(&values)
///     .required("nombre")
///     .int_range("edad", 1, 120)
///     .finish();
/// assert_eq!(errors.len(), 2);
/// ```
pub struct Rules<'a> {
    values: &'a FieldValues,
    errors: ErrorMap,
}

impl<'a> Rules<'a> {
    pub fn new(values: &'a FieldValues) -> Self {
        Rules {
            values,
            errors: ErrorMap::new(),
        }
    }

    pub fn values(&self) -> &'a FieldValues {
        self.values
    }

    /// Adds `error` when `failed` holds.
    pub fn check(mut self, failed: bool, error: ValidationError) -> Self {
        if failed {
            self.errors.push(error);
        }
        self
    }

    /// Non-blank text (or populated reference).
    pub fn required(self, field: &str) -> Self {
        let blank = self.values.reference(field).trim().is_empty();
        self.check(blank, ValidationError::Required { field: field.to_string() })
    }

    pub fn min_len(self, field: &str, min: usize) -> Self {
        let short = self.values.text(field).chars().count() < min;
        self.check(short, ValidationError::TooShort { field: field.to_string(), min })
    }

    /// Number strictly above zero; blank counts as missing.
    pub fn positive(self, field: &str) -> Self {
        let failed = !self.values.number(field).is_some_and(|n| n > 0.0);
        self.check(failed, ValidationError::MustBePositive { field: field.to_string() })
    }

    /// Positive when present; blank is allowed.
    pub fn positive_if_present(self, field: &str) -> Self {
        let failed = self.values.number(field).is_some_and(|n| n <= 0.0);
        self.check(failed, ValidationError::MustBePositive { field: field.to_string() })
    }

    /// Whole number in `min..=max`; blank counts as out of range.
    pub fn int_range(self, field: &str, min: i64, max: i64) -> Self {
        let failed = !self
            .values
            .number(field)
            .is_some_and(|n| n.fract() == 0.0 && n >= min as f64 && n <= max as f64);
        self.check(failed, ValidationError::OutOfRange { field: field.to_string(), min, max })
    }

    /// Number in `min..=max` when present.
    pub fn range_if_present(self, field: &str, min: i64, max: i64) -> Self {
        let failed = self
            .values
            .number(field)
            .is_some_and(|n| n < min as f64 || n > max as f64);
        self.check(failed, ValidationError::OutOfRange { field: field.to_string(), min, max })
    }

    /// Text must satisfy `format`; `reason` describes the expected shape.
    pub fn format(self, field: &str, format: fn(&str) -> bool, reason: &str) -> Self {
        let failed = !format(self.values.text(field).trim());
        self.check(
            failed,
            ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: reason.to_string(),
            },
        )
    }

    pub fn non_empty_list(self, field: &str, item: &str) -> Self {
        let empty = self.values.list(field).is_empty();
        self.check(
            empty,
            ValidationError::Empty {
                field: field.to_string(),
                item: item.to_string(),
            },
        )
    }

    pub fn one_of(self, field: &str, allowed: &[&str]) -> Self {
        let value = self.values.text(field).trim().to_lowercase();
        let failed = !allowed.iter().any(|a| a.eq_ignore_ascii_case(&value));
        self.check(
            failed,
            ValidationError::NotAllowed {
                field: field.to_string(),
                allowed: allowed.iter().map(|a| a.to_string()).collect(),
            },
        )
    }

    /// Applies `rule` only when `condition` holds.
    pub fn when(self, condition: bool, rule: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            rule(self)
        } else {
            self
        }
    }

    pub fn finish(self) -> ErrorMap {
        self.errors
    }
}

// =============================================================================
// Field Formats
// =============================================================================

static DUI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}-\d$").expect("valid DUI regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+503\d{8}$").expect("valid phone regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid e-mail regex"));
static OBJECT_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-fA-F0-9]{24}$").expect("valid id regex"));

/// Salvadoran national id: `12345678-9`.
///
/// ```rust
/// use optica_core::validation::is_dui;
///
/// assert!(is_dui("12345678-9"));
/// assert!(!is_dui("1234567-89"));
/// ```
pub fn is_dui(value: &str) -> bool {
    DUI.is_match(value)
}

/// Phone with country code: `+503` followed by eight digits.
pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// 24-hex-digit document id.
pub fn is_object_id(value: &str) -> bool {
    OBJECT_ID.is_match(value)
}

// =============================================================================
// List Inputs
// =============================================================================

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (identity search)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a page size (`1..=MAX_PAGE_SIZE`).
pub fn validate_page_size(size: usize) -> ValidationResult<usize> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "page size".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE as i64,
        });
    }

    Ok(size)
}

// =============================================================================
// Unit Tests
// =============================================================================
