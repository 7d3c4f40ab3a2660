//! # Promotions
//!
//! Promotion records, their lifecycle status and the descriptors the
//! price resolver consumes.
//!
//! ## Status Lifecycle
//! ```text
//!            fechaInicio                 fechaFin
//!                 │                          │
//!   ──────────────┼──────────────────────────┼──────────────► time
//!     Scheduled   │          Active          │   Expired
//!                 │                          │
//!   activo == false at any time ───────────────► Inactive
//! ```
//!
//! Checks are evaluated in the order Inactive → Scheduled → Expired →
//! Active. Both window edges are inclusive: a promotion is still active at
//! exactly `fechaFin`. Missing dates leave that side of the window open.
//!
//! Only Active promotions with a percentage or fixed-amount discount are
//! offered to the product form ([`offerable_promotions`]).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::lenient;
use crate::money::{Money, Percentage};

// =============================================================================
// Discount Kind
// =============================================================================

/// Kind of discount a promotion grants.
///
/// The backend spells these `porcentaje` and `monto` (older records use
/// `fijo`). Other kinds (e.g. `2x1`) are listed but never priced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiscountKind {
    #[default]
    Percentage,
    FixedAmount,
    Other(String),
}

impl DiscountKind {
    /// Parses the wire spelling, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "porcentaje" | "percentage" => DiscountKind::Percentage,
            "monto" | "fijo" | "fixed" => DiscountKind::FixedAmount,
            other => DiscountKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DiscountKind::Percentage => "porcentaje",
            DiscountKind::FixedAmount => "monto",
            DiscountKind::Other(raw) => raw,
        }
    }
}

impl Serialize for DiscountKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiscountKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = lenient::text(d)?;
        Ok(DiscountKind::parse(&raw))
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Promotion Record
// =============================================================================

/// What a promotion applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionScope {
    #[default]
    Todos,
    Categoria,
    Lente,
}

impl PromotionScope {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "categoria" | "categorias" => PromotionScope::Categoria,
            "lente" | "lentes" => PromotionScope::Lente,
            _ => PromotionScope::Todos,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionScope::Todos => "todos",
            PromotionScope::Categoria => "categoria",
            PromotionScope::Lente => "lente",
        }
    }
}

impl Serialize for PromotionScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PromotionScope {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = lenient::text(d)?;
        Ok(PromotionScope::parse(&raw))
    }
}

fn default_active() -> bool {
    true
}

/// `activo` is only false when the backend says so explicitly.
fn active_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(match value {
        serde_json::Value::Null => true,
        other => lenient::value_as_bool(&other),
    })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Promotion {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub descripcion: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub codigo_promo: String,

    #[serde(default)]
    #[ts(type = "string")]
    pub tipo_descuento: DiscountKind,

    /// Percent (`20` = 20%) or amount in major units, depending on the kind.
    #[serde(default, deserialize_with = "lenient::number")]
    pub valor_descuento: f64,

    #[serde(default)]
    #[ts(type = "string")]
    pub aplica_a: PromotionScope,

    #[serde(default, deserialize_with = "lenient::string_list_of_refs")]
    pub categorias_aplicables: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list_of_refs")]
    pub lentes_aplicables: Vec<String>,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha_inicio: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(type = "string | null")]
    pub fecha_fin: Option<DateTime<Utc>>,

    #[serde(default = "default_active", deserialize_with = "active_flag")]
    pub activo: bool,
}

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PromotionStatus {
    #[serde(rename = "activa")]
    Active,
    #[serde(rename = "programada")]
    Scheduled,
    #[serde(rename = "expirada")]
    Expired,
    #[serde(rename = "inactiva")]
    Inactive,
}

impl PromotionStatus {
    pub const ALL: [PromotionStatus; 4] = [
        PromotionStatus::Active,
        PromotionStatus::Scheduled,
        PromotionStatus::Expired,
        PromotionStatus::Inactive,
    ];

    /// Filter value / wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionStatus::Active => "activa",
            PromotionStatus::Scheduled => "programada",
            PromotionStatus::Expired => "expirada",
            PromotionStatus::Inactive => "inactiva",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PromotionStatus::Active => "Activa",
            PromotionStatus::Scheduled => "Programada",
            PromotionStatus::Expired => "Expirada",
            PromotionStatus::Inactive => "Inactiva",
        }
    }
}

impl fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Promotion {
    /// Lifecycle status at `now`.
    pub fn status(&self, now: DateTime<Utc>) -> PromotionStatus {
        if !self.activo {
            return PromotionStatus::Inactive;
        }
        if self.fecha_inicio.is_some_and(|start| now < start) {
            return PromotionStatus::Scheduled;
        }
        if self.fecha_fin.is_some_and(|end| now > end) {
            return PromotionStatus::Expired;
        }
        PromotionStatus::Active
    }

    /// Price descriptor, or `None` for kinds the resolver cannot price.
    pub fn descriptor(&self) -> Option<PromotionDescriptor> {
        let discount = match &self.tipo_descuento {
            DiscountKind::Percentage => Discount::Percentage(Percentage::from_percent(self.valor_descuento)),
            DiscountKind::FixedAmount => Discount::FixedAmount(Money::from_major(self.valor_descuento).non_negative()),
            DiscountKind::Other(_) => return None,
        };
        Some(PromotionDescriptor {
            id: self.id.clone(),
            discount,
            valid_until: self.fecha_fin,
        })
    }

    /// Short label for pickers: `Verano 2024 (20%)`, `Lentes (-$15.00)`.
    pub fn label(&self) -> String {
        match self.descriptor().map(|d| d.discount) {
            Some(Discount::Percentage(p)) => format!("{} ({}%)", self.nombre, p.percent()),
            Some(Discount::FixedAmount(m)) => format!("{} (-{})", self.nombre, m),
            None => format!("{} ({})", self.nombre, self.tipo_descuento),
        }
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// The discount part of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    Percentage(Percentage),
    FixedAmount(Money),
}

/// Everything the price resolver needs to know about a promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionDescriptor {
    pub id: String,
    pub discount: Discount,
    pub valid_until: Option<DateTime<Utc>>,
}

impl PromotionDescriptor {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|end| now > end)
    }
}

/// Promotions that may be offered on the product form at `now`:
/// active, priceable, in listing order.
pub fn offerable_promotions(promotions: &[Promotion], now: DateTime<Utc>) -> Vec<PromotionDescriptor> {
    promotions
        .iter()
        .filter(|p| p.status(now) == PromotionStatus::Active)
        .filter_map(Promotion::descriptor)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn promo(value: serde_json::Value) -> Promotion {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_status_lifecycle() {
        let p = promo(json!({
            "_id": "p1",
            "nombre": "Verano",
            "tipoDescuento": "porcentaje",
            "valorDescuento": 20,
            "fechaInicio": "2024-06-01",
            "fechaFin": "2024-08-31"
        }));
        assert_eq!(p.status(at(2024, 5, 1)), PromotionStatus::Scheduled);
        assert_eq!(p.status(at(2024, 7, 1)), PromotionStatus::Active);
        assert_eq!(p.status(at(2024, 9, 1)), PromotionStatus::Expired);

        let off = Promotion { activo: false, ..p };
        assert_eq!(off.status(at(2024, 7, 1)), PromotionStatus::Inactive);
    }

    #[test]
    fn test_missing_activo_means_active() {
        let p = promo(json!({ "_id": "p1", "activo": null }));
        assert!(p.activo);
        let p = promo(json!({ "_id": "p1" }));
        assert!(p.activo);
        let p = promo(json!({ "_id": "p1", "activo": false }));
        assert!(!p.activo);
    }

    #[test]
    fn test_kind_spellings() {
        assert_eq!(DiscountKind::parse("Porcentaje"), DiscountKind::Percentage);
        assert_eq!(DiscountKind::parse("fijo"), DiscountKind::FixedAmount);
        assert_eq!(DiscountKind::parse("monto"), DiscountKind::FixedAmount);
        assert_eq!(DiscountKind::parse("2x1"), DiscountKind::Other("2x1".into()));
    }

    #[test]
    fn test_offerable_excludes_expired_inactive_and_unpriceable() {
        let now = at(2024, 7, 1);
        let list = vec![
            promo(json!({ "_id": "a", "tipoDescuento": "porcentaje", "valorDescuento": 10 })),
            promo(json!({ "_id": "b", "tipoDescuento": "monto", "valorDescuento": 5, "fechaFin": "2024-06-30" })),
            promo(json!({ "_id": "c", "tipoDescuento": "monto", "valorDescuento": 5, "activo": false })),
            promo(json!({ "_id": "d", "tipoDescuento": "2x1" })),
            promo(json!({ "_id": "e", "tipoDescuento": "fijo", "valorDescuento": "7.5" })),
        ];
        let offered = offerable_promotions(&list, now);
        let ids: Vec<_> = offered.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "e"]);
        assert_eq!(offered[1].discount, Discount::FixedAmount(Money::from_cents(750)));
    }

    #[test]
    fn test_applicability_lists_accept_populated_refs() {
        let p = promo(json!({
            "aplicaA": "Categoria",
            "categoriasAplicables": ["c1", { "_id": "c2", "nombre": "Sol" }, 5]
        }));
        assert_eq!(p.aplica_a, PromotionScope::Categoria);
        assert_eq!(p.categorias_aplicables, vec!["c1".to_string(), "c2".to_string()]);
    }
}
