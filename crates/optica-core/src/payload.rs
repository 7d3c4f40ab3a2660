//! # Submit Payloads
//!
//! Turns validated form values into the body handed to the Submit
//! collaborator.
//!
//! ```text
//!   FieldValues ──► payload_for(screen) ──► SubmitPayload
//!                                               ├── Json(Value)          no files attached
//!                                               └── Multipart(Vec<Part>) files attached;
//!                                                   nested values become JSON-string parts
//! ```

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::field_store::FieldValues;
use crate::lenient;
use crate::promotion::{DiscountKind, PromotionScope};
use crate::reference::ReferenceTable;
use crate::screens::ScreenKind;
use crate::validation::{is_object_id, FormMode};

// =============================================================================
// Payload Types
// =============================================================================

/// A file picked on the form (e.g. a product photo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Form field the file is sent under.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    Text(String),
    File(Attachment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub content: PartContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitPayload {
    Json(Value),
    Multipart(Vec<Part>),
}

impl SubmitPayload {
    /// JSON when nothing is attached, multipart otherwise.
    pub fn build(body: Value, attachments: Vec<Attachment>) -> CoreResult<Self> {
        if attachments.is_empty() {
            return Ok(SubmitPayload::Json(body));
        }

        let Value::Object(fields) = body else {
            return Err(CoreError::Payload {
                reason: "multipart body must be an object".to_string(),
            });
        };

        let mut parts = Vec::with_capacity(fields.len() + attachments.len());
        for (name, value) in fields {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                nested @ (Value::Array(_) | Value::Object(_)) => {
                    serde_json::to_string(&nested).map_err(|err| CoreError::Payload {
                        reason: format!("{}: {}", name, err),
                    })?
                }
            };
            parts.push(Part {
                name,
                content: PartContent::Text(text),
            });
        }
        parts.extend(attachments.into_iter().map(|file| Part {
            name: file.field.clone(),
            content: PartContent::File(file),
        }));
        Ok(SubmitPayload::Multipart(parts))
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, SubmitPayload::Multipart(_))
    }
}

// =============================================================================
// Normalisation
// =============================================================================

/// Top-level strings trimmed, `_id` dropped.
fn base_body(values: &FieldValues) -> Map<String, Value> {
    let mut body: Map<String, Value> = match values.as_value() {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => Value::String(s.trim().to_string()),
                    other => other.clone(),
                };
                (k.clone(), v)
            })
            .collect(),
        _ => Map::new(),
    };
    body.remove("_id");
    body
}

fn number(values: &FieldValues, path: &str) -> Value {
    Value::from(values.number(path).unwrap_or(0.0))
}

/// Body for the form of `screen`.
///
/// Products, employees and promotions carry their own normalisation; the
/// remaining screens send the generic [`form_payload`].
pub fn payload_for(
    screen: ScreenKind,
    values: &FieldValues,
    mode: FormMode,
    references: &ReferenceTable,
) -> Value {
    match screen {
        ScreenKind::Products(_) => product_payload(values, references),
        ScreenKind::Employees => employee_payload(values, mode),
        ScreenKind::Promotions => promotion_payload(values),
        ScreenKind::Clients | ScreenKind::Branches | ScreenKind::Prescriptions | ScreenKind::Sales => {
            form_payload(values)
        }
    }
}

/// Generic body: top-level strings trimmed, `_id` dropped.
pub fn form_payload(values: &FieldValues) -> Value {
    Value::Object(base_body(values))
}

/// Employee body: in edit mode a blank password is left out so the stored
/// one is kept.
pub fn employee_payload(values: &FieldValues, mode: FormMode) -> Value {
    let mut body = base_body(values);
    if mode == FormMode::Edit && values.text("password").trim().is_empty() {
        body.remove("password");
    }
    body.insert("salario".to_string(), number(values, "salario"));
    body.insert("sucursalId".to_string(), Value::String(values.reference("sucursalId")));
    Value::Object(body)
}

/// Product body (frames, lenses, accessories).
///
/// - text trimmed, references flattened to ids
/// - `precioActual = precioBase` and no `promocionId` when not on promotion
/// - branch stock kept only for entries whose `sucursalId` is a document id;
///   missing branch names are filled from `references["sucursales"]`
pub fn product_payload(values: &FieldValues, references: &ReferenceTable) -> Value {
    let mut body = base_body(values);

    let on_promotion = values.flag("enPromocion");
    let base = number(values, "precioBase");
    let actual = if on_promotion {
        number(values, "precioActual")
    } else {
        base.clone()
    };
    body.insert("precioBase".to_string(), base);
    body.insert("precioActual".to_string(), actual);
    body.insert("enPromocion".to_string(), Value::Bool(on_promotion));

    if on_promotion {
        body.insert("promocionId".to_string(), Value::String(values.reference("promocionId")));
    } else {
        body.remove("promocionId");
    }

    for field in ["categoriaId", "marcaId"] {
        if values.lookup(field).is_some() {
            body.insert(field.to_string(), Value::String(values.reference(field)));
        }
    }

    if values.lookup("medidas").is_some() {
        let mut medidas = Map::new();
        for part in ["anchoPuente", "altura", "ancho"] {
            medidas.insert(part.to_string(), number(values, &format!("medidas.{part}")));
        }
        body.insert("medidas".to_string(), Value::Object(medidas));
    }

    let images: Vec<Value> = values
        .list("imagenes")
        .iter()
        .map(lenient::value_as_text)
        .filter(|url| !url.trim().is_empty())
        .map(Value::String)
        .collect();
    body.insert("imagenes".to_string(), Value::Array(images));

    let branches: Vec<Value> = values
        .list("sucursales")
        .iter()
        .filter_map(|entry| branch_stock_entry(entry, references))
        .collect();
    body.insert("sucursales".to_string(), Value::Array(branches));

    Value::Object(body)
}

/// Promotion body: dates as RFC 3339, applicability lists only for the
/// matching scope, `activo` true unless explicitly false.
pub fn promotion_payload(values: &FieldValues) -> Value {
    let mut body = base_body(values);

    let scope = PromotionScope::parse(&values.text("aplicaA"));
    body.insert("aplicaA".to_string(), Value::String(scope.as_str().to_string()));
    body.insert(
        "tipoDescuento".to_string(),
        Value::String(DiscountKind::parse(&values.text("tipoDescuento")).as_str().to_string()),
    );
    body.insert("valorDescuento".to_string(), number(values, "valorDescuento"));

    for (field, applies) in [
        ("categoriasAplicables", scope == PromotionScope::Categoria),
        ("lentesAplicables", scope == PromotionScope::Lente),
    ] {
        let ids: Vec<Value> = if applies {
            values
                .list(field)
                .iter()
                .map(|entry| match entry {
                    Value::Object(map) => map.get("_id").map(lenient::value_as_text).unwrap_or_default(),
                    other => lenient::value_as_text(other),
                })
                .filter(|id| !id.is_empty())
                .map(Value::String)
                .collect()
        } else {
            Vec::new()
        };
        body.insert(field.to_string(), Value::Array(ids));
    }

    for field in ["fechaInicio", "fechaFin"] {
        let date = values
            .lookup(field)
            .and_then(lenient::value_as_date)
            .map(|d| Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .unwrap_or(Value::Null);
        body.insert(field.to_string(), date);
    }

    let active = values.lookup("activo").map_or(true, |v| v.is_null() || lenient::value_as_bool(v));
    body.insert("activo".to_string(), Value::Bool(active));
    Value::Object(body)
}

fn branch_stock_entry(entry: &Value, references: &ReferenceTable) -> Option<Value> {
    let entry = FieldValues::from_value(entry.clone());
    let branch_id = entry.reference("sucursalId");
    if !is_object_id(&branch_id) {
        tracing::debug!(%branch_id, "dropping branch stock entry without a valid branch id");
        return None;
    }

    let mut name = entry.text("nombreSucursal");
    if name.trim().is_empty() {
        name = entry.text("sucursalId.nombre");
    }
    if name.trim().is_empty() {
        name = references.lookup("sucursales", &branch_id).unwrap_or_default().to_string();
    }

    let stock = entry.number("stock").map(|s| s.trunc() as i64).unwrap_or(0);

    let mut out = Map::new();
    out.insert("sucursalId".to_string(), Value::String(branch_id));
    out.insert("nombreSucursal".to_string(), Value::String(name.trim().to_string()));
    out.insert("stock".to_string(), Value::from(stock));
    Some(Value::Object(out))
}

// =============================================================================
// Unit Tests
// =============================================================================
