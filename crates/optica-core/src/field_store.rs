//! # Field Store
//!
//! Form state for the create/edit dialogs: values, per-field errors and the
//! set of fields the operator has touched.
//!
//! ## Snapshot Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FieldStore                                                             │
//! │    values: Arc<Value> ───────┐                                          │
//! │    errors: ErrorMap          │  snapshot() hands out an Arc clone       │
//! │    touched: BTreeSet         │                                          │
//! │    attempted: bool           │                                          │
//! │                              ▼                                          │
//! │  FieldValues (snapshot) ── Arc<Value> ── never changes afterwards       │
//! │                                                                         │
//! │  set("medidas.ancho", 52)                                               │
//! │    → Arc::make_mut: clones the tree only if a snapshot is still alive   │
//! │    → creates "medidas" as {} when missing                               │
//! │    → clears errors["medidas.ancho"], marks it touched                   │
//! │                                                                         │
//! │  set_and_validate(path, value, validator)                               │
//! │    → set, then the whole error map is recomputed (cross-field rules)    │
//! │    → visible_error(path) shows it once touched or after a submit try   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads never fail: a missing path yields the zero value of the field's
//! declared [`FieldKind`] (`""`, `0`, `false`, `[]`, `{}`).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::lenient;
use crate::validation::{ErrorMap, FormMode, Validator};

// =============================================================================
// Field Kinds
// =============================================================================

/// Declared kind of a form field; decides the zero value of reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    List,
    Object,
}

impl FieldKind {
    pub fn zero_value(&self) -> Value {
        match self {
            FieldKind::Text => Value::String(String::new()),
            FieldKind::Number => Value::from(0),
            FieldKind::Flag => Value::Bool(false),
            FieldKind::List => Value::Array(Vec::new()),
            FieldKind::Object => Value::Object(Map::new()),
        }
    }
}

// =============================================================================
// Path helpers
// =============================================================================

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Walks to `path`, creating intermediate objects, and stores `value`.
fn assign(root: &mut Value, path: &str, value: Value) {
    let mut node = root;
    for segment in path.split('.') {
        node = child_mut(node, segment);
    }
    *node = value;
}

/// Child slot for one path segment. Numeric segments index into existing
/// arrays (one past the end appends); anything else turns the node into an
/// object.
fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let array_index = match (&*node, segment.parse::<usize>()) {
        (Value::Array(items), Ok(i)) if i <= items.len() => Some(i),
        _ => None,
    };
    if array_index.is_none() && !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match (node, array_index) {
        (Value::Array(items), Some(i)) => {
            if i == items.len() {
                items.push(Value::Null);
            }
            &mut items[i]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        (other, _) => other,
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable view of the form values at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues {
    root: Arc<Value>,
}

impl Default for FieldValues {
    fn default() -> Self {
        FieldValues::from_value(Value::Object(Map::new()))
    }
}

impl FieldValues {
    pub fn from_value(value: Value) -> Self {
        let root = if value.is_object() {
            value
        } else {
            Value::Object(Map::new())
        };
        FieldValues { root: Arc::new(root) }
    }

    /// Raw value at a dotted path.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// Text at `path`; numbers are rendered, anything else is empty.
    pub fn text(&self, path: &str) -> String {
        self.lookup(path).map(lenient::value_as_text).unwrap_or_default()
    }

    /// Number at `path`; `None` when absent, blank or not numeric.
    pub fn number(&self, path: &str) -> Option<f64> {
        self.lookup(path).and_then(lenient::value_as_f64)
    }

    pub fn flag(&self, path: &str) -> bool {
        self.lookup(path).map(lenient::value_as_bool).unwrap_or(false)
    }

    /// Array at `path`, empty when absent or not an array.
    pub fn list(&self, path: &str) -> &[Value] {
        match self.lookup(path) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Id stored at `path`: a bare id string or a populated `{_id}` object.
    pub fn reference(&self, path: &str) -> String {
        match self.lookup(path) {
            Some(Value::Object(map)) => map
                .get("_id")
                .map(lenient::value_as_text)
                .unwrap_or_default(),
            Some(other) => lenient::value_as_text(other),
            None => String::new(),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Arc::try_unwrap(self.root).unwrap_or_else(|shared| (*shared).clone())
    }
}

// =============================================================================
// Field Store
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    values: FieldValues,
    kinds: BTreeMap<String, FieldKind>,
    errors: ErrorMap,
    touched: BTreeSet<String>,
    /// A submit was attempted; every error is shown from then on.
    attempted: bool,
}

impl FieldStore {
    /// Empty store (create mode) with declared field kinds.
    pub fn new<'a>(kinds: impl IntoIterator<Item = (&'a str, FieldKind)>) -> Self {
        FieldStore {
            kinds: kinds
                .into_iter()
                .map(|(path, kind)| (path.to_string(), kind))
                .collect(),
            ..Default::default()
        }
    }

    /// Declares kinds and starts from `initial` values.
    pub fn with_initial<'a>(kinds: impl IntoIterator<Item = (&'a str, FieldKind)>, initial: Value) -> Self {
        let mut store = FieldStore::new(kinds);
        store.values = FieldValues::from_value(initial);
        store
    }

    /// Edit mode: pre-populates the store from an existing record.
    pub fn from_record<'a, R: Serialize>(
        kinds: impl IntoIterator<Item = (&'a str, FieldKind)>,
        record: &R,
    ) -> Self {
        let initial = serde_json::to_value(record).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "record did not serialize, starting from an empty form");
            Value::Object(Map::new())
        });
        FieldStore::with_initial(kinds, initial)
    }

    pub fn kind_of(&self, path: &str) -> FieldKind {
        self.kinds.get(path).copied().unwrap_or(FieldKind::Text)
    }

    /// Value at `path`, or the zero value of its declared kind.
    pub fn get(&self, path: &str) -> Value {
        match self.values.lookup(path) {
            Some(Value::Null) | None => self.kind_of(path).zero_value(),
            Some(value) => value.clone(),
        }
    }

    /// Stores `value` at `path`, clears that field's error and marks it touched.
    ///
    /// Snapshots handed out earlier keep their contents.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        assign(Arc::make_mut(&mut self.values.root), path, value.into());
        self.errors.remove(path);
        self.touched.insert(path.to_string());
    }

    /// Stores `value` at `path`, then recomputes the whole error map.
    ///
    /// Rules spanning several fields (`precioActual < precioBase`) are
    /// re-evaluated on every change, so an error on one field clears when
    /// another field fixes it. Returns whether the form is valid.
    pub fn set_and_validate<V: Validator + ?Sized>(
        &mut self,
        path: &str,
        value: impl Into<Value>,
        validator: &V,
        mode: FormMode,
    ) -> bool {
        self.set(path, value);
        self.recompute(validator, mode)
    }

    /// Replaces all values; errors, touched and the submit attempt are cleared.
    pub fn reset(&mut self, initial: Value) {
        self.values = FieldValues::from_value(initial);
        self.errors = ErrorMap::new();
        self.touched.clear();
        self.attempted = false;
    }

    pub fn snapshot(&self) -> FieldValues {
        self.values.clone()
    }

    /// Submit attempt: recomputes the whole error map and reveals every
    /// error. Returns whether submission may proceed.
    pub fn validate<V: Validator + ?Sized>(&mut self, validator: &V, mode: FormMode) -> bool {
        self.attempted = true;
        self.recompute(validator, mode)
    }

    fn recompute<V: Validator + ?Sized>(&mut self, validator: &V, mode: FormMode) -> bool {
        self.errors = validator.validate(&self.values, mode);
        if !self.errors.is_empty() {
            tracing::debug!(fields = self.errors.len(), "form validation failed");
        }
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path)
    }

    /// Error to display next to `path`: hidden until the field is touched
    /// or a submit was attempted.
    pub fn visible_error(&self, path: &str) -> Option<&str> {
        if self.attempted || self.is_touched(path) {
            self.error(path)
        } else {
            None
        }
    }

    /// First error in field order, for a summary line.
    pub fn first_error(&self) -> Option<(&str, &str)> {
        self.errors.first()
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.touched.contains(path)
    }

    pub fn touched(&self) -> impl Iterator<Item = &str> {
        self.touched.iter().map(String::as_str)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
