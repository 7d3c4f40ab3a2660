//! # List Pipeline
//!
//! Turns a loaded snapshot into the ordered list a screen pages through.
//!
//! ## Pipeline Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  records: Vec<Arc<T>>  (read-only snapshot from the Fetch collaborator) │
//! │       │                                                                 │
//! │       ▼  derive_rows     Row { position, record, derived }              │
//! │       │                  derived = joins, totals, status (once per run) │
//! │       ▼  search          case-insensitive substring, blank = identity   │
//! │       ▼  apply_filters   per-key predicates ANDed, sentinels pass       │
//! │       │                  min/max and from/to bounds (inclusive)         │
//! │       ▼  sort            one SortKey, stable, type-aware                │
//! │       ▼                                                                 │
//! │  Vec<Row<T>>  ──► Paginator::slice                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each screen plugs in through [`Listable`]: which text is searchable,
//! what a filter key means, which number the min/max range bounds and how
//! a field sorts.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::reference::ReferenceTable;
use crate::ALL_SENTINELS;

// =============================================================================
// Context
// =============================================================================

/// Inputs a run needs besides the records: the clock reading and the
/// reference tables to join against.
#[derive(Debug, Clone)]
pub struct ListContext {
    pub now: DateTime<Utc>,
    pub references: ReferenceTable,
}

impl ListContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        ListContext {
            now,
            references: ReferenceTable::new(),
        }
    }

    pub fn with_references(mut self, references: ReferenceTable) -> Self {
        self.references = references;
        self
    }
}

// =============================================================================
// Sort Values & Keys
// =============================================================================

/// A comparable projection of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Already lower-cased.
    Text(String),
    Number(f64),
    /// Milliseconds since the epoch (0 when the date is missing).
    Date(i64),
}

impl SortValue {
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    pub fn date(value: Option<DateTime<Utc>>) -> Self {
        SortValue::Date(value.map(|d| d.timestamp_millis()).unwrap_or(0))
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Text(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Date(_) => 2,
        }
    }

    /// Total order: texts lexically, numbers by `total_cmp`, dates by epoch.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(CoreError::InvalidSortField {
                field: format!("direction '{}'", other),
            }),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// The single active ordering of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> SortKey<F> {
    pub fn asc(field: F) -> Self {
        SortKey {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        SortKey {
            field,
            direction: SortDirection::Desc,
        }
    }
}

impl<F: FromStr<Err = CoreError>> SortKey<F> {
    /// Parses `field` or `field:asc|desc`.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let (field, direction) = match raw.split_once(':') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (raw, SortDirection::Asc),
        };
        Ok(SortKey {
            field: field.trim().parse()?,
            direction,
        })
    }
}

// =============================================================================
// Filter Spec
// =============================================================================

/// Whether a filter value means "no constraint".
pub fn is_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || ALL_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(value))
}

/// Selected advanced filters of a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    values: BTreeMap<String, String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        FilterSpec::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Selects `value` for `key`; a sentinel removes the constraint.
    pub fn set(&mut self, key: &str, value: &str) {
        if is_sentinel(value) {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), value.trim().to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.min = min.filter(|v| v.is_finite());
        self.max = max.filter(|v| v.is_finite());
    }

    pub fn set_date_range(&mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) {
        self.from = from;
        self.to = to;
    }

    pub fn clear(&mut self) {
        *self = FilterSpec::default();
    }

    /// Constraining key/value pairs.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_identity(&self) -> bool {
        self.values.is_empty()
            && self.min.is_none()
            && self.max.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }
}

// =============================================================================
// Listable
// =============================================================================

/// A record type that a management screen can list.
pub trait Listable: fmt::Debug {
    /// Composites computed once per record per run (joins, totals, status).
    type Derived: Clone + fmt::Debug;

    /// Sortable fields of the screen.
    type SortField: Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = CoreError>;

    /// Filter keys the screen understands (others never exclude).
    const FILTER_KEYS: &'static [&'static str];

    /// Field the min/max range bounds, if the screen has one.
    const RANGE_FIELD: Option<&'static str> = None;

    /// Field the from/to date range bounds, if the screen has one.
    const DATE_FIELD: Option<&'static str> = None;

    fn id(&self) -> &str;

    fn derive(&self, ctx: &ListContext) -> Self::Derived;

    /// Texts searched by the search box.
    fn search_fields<'a>(&'a self, derived: &'a Self::Derived) -> Vec<&'a str>;

    /// Whether the record passes `key = value` (value is never a sentinel).
    fn matches_filter(&self, derived: &Self::Derived, key: &str, value: &str) -> bool;

    /// Value bounded by min/max (0 when missing).
    fn range_value(&self, _derived: &Self::Derived) -> f64 {
        0.0
    }

    /// Date bounded by from/to (`None` is treated as the epoch).
    fn date_value(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn sort_value(&self, derived: &Self::Derived, field: Self::SortField) -> SortValue;
}

/// Case-insensitive equality for filter values.
pub fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

// =============================================================================
// Rows
// =============================================================================

/// A record plus its derived composites. `position` is the index in the
/// loaded snapshot.
#[derive(Debug)]
pub struct Row<T: Listable> {
    pub position: usize,
    pub record: Arc<T>,
    pub derived: T::Derived,
}

impl<T: Listable> Clone for Row<T> {
    fn clone(&self) -> Self {
        Row {
            position: self.position,
            record: Arc::clone(&self.record),
            derived: self.derived.clone(),
        }
    }
}

pub fn derive_rows<T: Listable>(records: &[Arc<T>], ctx: &ListContext) -> Vec<Row<T>> {
    records
        .iter()
        .enumerate()
        .map(|(position, record)| Row {
            position,
            derived: record.derive(ctx),
            record: Arc::clone(record),
        })
        .collect()
}

// =============================================================================
// Stages
// =============================================================================

/// Keeps rows where any search field contains `term`, ignoring case.
pub fn search<T: Listable>(rows: Vec<Row<T>>, term: &str) -> Vec<Row<T>> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| {
            row.record
                .search_fields(&row.derived)
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Keeps rows satisfying every active constraint of `spec`.
pub fn apply_filters<T: Listable>(rows: Vec<Row<T>>, spec: &FilterSpec) -> Vec<Row<T>> {
    if spec.is_identity() {
        return rows;
    }
    let use_range = T::RANGE_FIELD.is_some();
    let use_dates = T::DATE_FIELD.is_some();

    rows.into_iter()
        .filter(|row| {
            let record = &row.record;
            if !spec
                .active()
                .all(|(key, value)| record.matches_filter(&row.derived, key, value))
            {
                return false;
            }
            if use_range {
                let value = record.range_value(&row.derived);
                if spec.min.is_some_and(|min| value < min) || spec.max.is_some_and(|max| value > max) {
                    return false;
                }
            }
            if use_dates {
                let millis = record.date_value().map(|d| d.timestamp_millis()).unwrap_or(0);
                if spec.from.is_some_and(|from| millis < from.timestamp_millis())
                    || spec.to.is_some_and(|to| millis > to.timestamp_millis())
                {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Stable sort by one key. Descending reverses the comparator, so ties keep
/// their upstream order in both directions.
pub fn sort<T: Listable>(rows: Vec<Row<T>>, key: &SortKey<T::SortField>) -> Vec<Row<T>> {
    let mut keyed: Vec<(SortValue, Row<T>)> = rows
        .into_iter()
        .map(|row| (row.record.sort_value(&row.derived, key.field), row))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.compare(b);
        match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, row)| row).collect()
}

/// Runs every stage in order.
pub fn run<T: Listable>(
    records: &[Arc<T>],
    ctx: &ListContext,
    term: &str,
    spec: &FilterSpec,
    sort_key: Option<&SortKey<T::SortField>>,
) -> Vec<Row<T>> {
    let rows = derive_rows(records, ctx);
    let rows = search(rows, term);
    let rows = apply_filters(rows, spec);
    let rows = match sort_key {
        Some(key) => sort(rows, key),
        None => rows,
    };
    tracing::debug!(
        loaded = records.len(),
        shown = rows.len(),
        term = %term.trim(),
        "list pipeline run"
    );
    rows
}

// =============================================================================
// Unit Tests
// =============================================================================
