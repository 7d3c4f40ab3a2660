//! # Domain Types
//!
//! Entity schemas for the records each management screen lists.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Client      │   │    Employee     │       │
//! │  │  aros / lentes  │   │  dui, telefono  │   │  cargo, salario │       │
//! │  │  precioBase     │   │  direccion {}   │   │  sucursalId ──┐ │       │
//! │  │  sucursales[] ──┼─┐ └─────────────────┘   └───────────────┼─┘       │
//! │  └─────────────────┘ │                                       │         │
//! │                      ▼                                       ▼         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  BranchStock    │   │     Branch      │   │      Ref        │       │
//! │  │  sucursalId     │──►│  nombre, estado │◄──│  "id" | {_id,…} │       │
//! │  │  stock          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Prescription   │   │      Sale       │   │   Promotion     │       │
//! │  │  ojoDerecho {}  │   │  facturaDatos{} │   │ (promotion.rs)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Defaulting at the Boundary
//! Every field is `#[serde(default)]` plus a [`crate::lenient`] decoder, so
//! the pipeline downstream can assume well-typed input: a missing or garbled
//! field is its zero value, never an `Option` the screen has to probe.
//!
//! Field names on the wire are the backend's (Spanish, camelCase, `_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::lenient;
use crate::money::Money;

// =============================================================================
// References
// =============================================================================

/// A populated reference document (`{"_id": "...", "nombre": "..."}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefDoc {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: String,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub apellido: String,
}

/// A reference to another document: a bare id, or the document itself
/// when the backend populated it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum Ref {
    Id(String),
    Populated(RefDoc),
}

impl Ref {
    /// Builds a bare id reference.
    pub fn id_only(id: impl Into<String>) -> Self {
        Ref::Id(id.into())
    }

    /// The referenced document id.
    pub fn id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Populated(doc) => &doc.id,
        }
    }

    /// Display name when the reference was populated (`nombre apellido`).
    pub fn display_name(&self) -> Option<String> {
        match self {
            Ref::Id(_) => None,
            Ref::Populated(doc) if doc.nombre.is_empty() => None,
            Ref::Populated(doc) if doc.apellido.is_empty() => Some(doc.nombre.clone()),
            Ref::Populated(doc) => Some(format!("{} {}", doc.nombre, doc.apellido)),
        }
    }
}

/// Id of an optional reference, empty when absent.
pub fn ref_id(reference: &Option<Ref>) -> &str {
    reference.as_ref().map(Ref::id).unwrap_or("")
}

/// Display name of an optional reference, empty when absent or unpopulated.
pub fn ref_name(reference: &Option<Ref>) -> String {
    reference
        .as_ref()
        .and_then(Ref::display_name)
        .unwrap_or_default()
}

// =============================================================================
// Product
// =============================================================================

/// Stock of a product at one branch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BranchStock {
    #[serde(default, deserialize_with = "lenient::reference")]
    pub sucursal_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre_sucursal: String,

    #[serde(default, deserialize_with = "lenient::integer")]
    #[ts(type = "number")]
    pub stock: i64,
}

impl BranchStock {
    pub fn branch_id(&self) -> &str {
        ref_id(&self.sucursal_id)
    }

    /// Branch name: the denormalised copy first, then the populated reference.
    pub fn branch_name(&self) -> String {
        if !self.nombre_sucursal.is_empty() {
            return self.nombre_sucursal.clone();
        }
        ref_name(&self.sucursal_id)
    }
}

/// Frame measurements in millimetres.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Measurements {
    #[serde(default, deserialize_with = "lenient::number")]
    pub ancho_puente: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub altura: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub ancho: f64,
}

/// A catalog product: frame ("aro"), lens ("lente") or accessory.
///
/// The three catalogs share one schema; fields a catalog does not use are
/// simply left at their zero value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub descripcion: String,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub categoria_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub marca_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub material: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub color: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub tipo_lente: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub linea: String,

    /// List price.
    #[serde(default)]
    #[ts(type = "number")]
    pub precio_base: Money,

    /// Price currently charged (equals `precio_base` off promotion).
    #[serde(default)]
    #[ts(type = "number")]
    pub precio_actual: Money,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub en_promocion: bool,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub promocion_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub medidas: Measurements,

    #[serde(default, deserialize_with = "lenient::image_list")]
    pub imagenes: Vec<String>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub sucursales: Vec<BranchStock>,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha_creacion: Option<DateTime<Utc>>,
}

impl Product {
    /// Sum of stock across branches, saturating at the `i64` bounds.
    pub fn total_stock(&self) -> i64 {
        self.sucursales
            .iter()
            .map(|s| s.stock)
            .fold(0, i64::saturating_add)
    }

    /// Stock held at one branch (0 when the product is not stocked there).
    pub fn stock_at(&self, branch_id: &str) -> i64 {
        self.sucursales
            .iter()
            .filter(|s| s.branch_id() == branch_id)
            .map(|s| s.stock)
            .fold(0, i64::saturating_add)
    }

    /// The price a customer pays today.
    pub fn effective_price(&self) -> Money {
        if self.en_promocion {
            self.precio_actual
        } else {
            self.precio_base
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Postal address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Address {
    #[serde(default, deserialize_with = "lenient::text")]
    pub calle: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub ciudad: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub departamento: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Client {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub apellido: String,

    #[serde(default, deserialize_with = "lenient::integer")]
    #[ts(type = "number")]
    pub edad: i64,

    /// National id, `12345678-9`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub dui: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub telefono: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub correo: String,

    #[serde(default, deserialize_with = "lenient::object")]
    pub direccion: Address,

    /// `Activo` / `Inactivo`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub estado: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha_registro: Option<DateTime<Utc>>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

// =============================================================================
// Employee
// =============================================================================

/// Staff member. The password is write-only and never decoded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub apellido: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub dui: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub telefono: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub correo: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub cargo: String,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub sucursal_id: Option<Ref>,

    #[serde(default)]
    #[ts(type = "number")]
    pub salario: Money,

    #[serde(default, deserialize_with = "lenient::text")]
    pub estado: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha_contratacion: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

// =============================================================================
// Branch
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Branch {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub codigo: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub direccion: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub departamento: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub municipio: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub telefono: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub correo: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub gerente: String,

    /// `Activa` / `Inactiva`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub estado: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub horario_apertura: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub horario_cierre: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha_apertura: Option<DateTime<Utc>>,
}

// =============================================================================
// Prescription
// =============================================================================

/// Refraction values for one eye.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EyeMeasurement {
    #[serde(default, deserialize_with = "lenient::number")]
    pub esfera: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub cilindro: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub eje: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub adicion: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Prescription {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub cliente_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub optometrista_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub diagnostico: String,

    #[serde(default, deserialize_with = "lenient::object")]
    pub ojo_derecho: EyeMeasurement,

    #[serde(default, deserialize_with = "lenient::object")]
    pub ojo_izquierdo: EyeMeasurement,

    /// Validity in months.
    #[serde(default, deserialize_with = "lenient::integer")]
    #[ts(type = "number")]
    pub vigencia: i64,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha: Option<DateTime<Utc>>,
}

// =============================================================================
// Sale
// =============================================================================

/// Invoice header printed on the receipt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceData {
    #[serde(default, deserialize_with = "lenient::text")]
    pub numero_factura: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre_cliente: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub dui_cliente: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha: Option<DateTime<Utc>>,

    /// `pendiente`, `procesada`, `completada`, `cancelada`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub estado: String,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub sucursal_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::reference")]
    pub empleado_id: Option<Ref>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub factura_datos: InvoiceData,

    #[serde(default)]
    #[ts(type = "number")]
    pub total: Money,

    #[serde(default, deserialize_with = "lenient::text")]
    pub observaciones: String,
}

// =============================================================================
// Reference catalog entries
// =============================================================================

/// A brand, category or branch as a lookup-table row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReferenceItem {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_decodes_populated_refs() {
        let product: Product = serde_json::from_value(json!({
            "_id": "64b7f0c2a1b2c3d4e5f60718",
            "nombre": "Aro Clásico",
            "marcaId": { "_id": "m1", "nombre": "Ray-Ban" },
            "categoriaId": "c1",
            "precioBase": 120.5,
            "precioActual": "96.40",
            "enPromocion": true,
            "sucursales": [
                { "sucursalId": { "_id": "s1", "nombre": "Centro" }, "stock": 4 },
                { "sucursalId": "s2", "nombreSucursal": "Santa Tecla", "stock": "3" }
            ]
        }))
        .unwrap();

        assert_eq!(product.marca_id.as_ref().map(Ref::id), Some("m1"));
        assert_eq!(ref_name(&product.marca_id), "Ray-Ban");
        assert_eq!(ref_id(&product.categoria_id), "c1");
        assert_eq!(product.precio_base.cents(), 12050);
        assert_eq!(product.effective_price().cents(), 9640);
        assert_eq!(product.total_stock(), 7);
        assert_eq!(product.stock_at("s2"), 3);
        assert_eq!(product.sucursales[0].branch_name(), "Centro");
    }

    #[test]
    fn test_malformed_fields_degrade_to_zero_values() {
        let product: Product = serde_json::from_value(json!({
            "_id": "x",
            "nombre": null,
            "precioBase": "gratis",
            "enPromocion": "yes please",
            "sucursales": "none",
            "medidas": 42,
            "marcaId": 17,
            "fechaCreacion": "ayer"
        }))
        .unwrap();

        assert_eq!(product.nombre, "");
        assert!(product.precio_base.is_zero());
        assert!(!product.en_promocion);
        assert!(product.sucursales.is_empty());
        assert_eq!(product.medidas, Measurements::default());
        assert!(product.marca_id.is_none());
        assert!(product.fecha_creacion.is_none());
    }

    #[test]
    fn test_effective_price_off_promotion_is_base() {
        let product = Product {
            precio_base: Money::from_cents(5000),
            precio_actual: Money::from_cents(4000),
            en_promocion: false,
            ..Default::default()
        };
        assert_eq!(product.effective_price().cents(), 5000);
    }

    #[test]
    fn test_ref_display_name() {
        let r = Ref::Populated(RefDoc {
            id: "e1".into(),
            nombre: "Ana".into(),
            apellido: "Rodríguez".into(),
        });
        assert_eq!(r.display_name().as_deref(), Some("Ana Rodríguez"));
        assert_eq!(Ref::id_only("e2").display_name(), None);
    }

    #[test]
    fn test_images_accept_upload_descriptors() {
        let product: Product = serde_json::from_value(json!({
            "imagenes": [
                "https://cdn.example/a.jpg",
                { "secure_url": "https://cdn.example/b.jpg", "public_id": "b" },
                { "public_id": "c" },
                7
            ]
        }))
        .unwrap();
        assert_eq!(product.imagenes.len(), 2);
    }
}
