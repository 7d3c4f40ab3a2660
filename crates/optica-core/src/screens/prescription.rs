//! # Prescription Screen
//!
//! A prescription ("receta") is valid for `vigencia` months from its date.
//! Whether it is still current depends on the caller's clock reading
//! ([`ListContext::now`]), so the status is derived per run.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, Utc};

use crate::error::CoreError;
use crate::field_store::{FieldKind, FieldValues};
use crate::pipeline::{same_text, ListContext, Listable, SortValue};
use crate::types::{ref_id, Prescription};
use crate::validation::{ErrorMap, FormMode, Rules};

pub const MAX_VALIDITY_MONTHS: i64 = 24;

impl Prescription {
    /// End of validity; `None` without a date or with a non-positive term.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let months = u32::try_from(self.vigencia).ok().filter(|m| *m > 0)?;
        self.fecha?.checked_add_months(Months::new(months))
    }

    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|end| now <= end)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrescriptionRow {
    pub client: String,
    pub optometrist: String,
    pub current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrescriptionSort {
    Fecha,
    Cliente,
    Vigencia,
}

impl FromStr for PrescriptionSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fecha" => Ok(PrescriptionSort::Fecha),
            "cliente" => Ok(PrescriptionSort::Cliente),
            "vigencia" => Ok(PrescriptionSort::Vigencia),
            _ => Err(CoreError::InvalidSortField { field: s.to_string() }),
        }
    }
}

impl fmt::Display for PrescriptionSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrescriptionSort::Fecha => "fecha",
            PrescriptionSort::Cliente => "cliente",
            PrescriptionSort::Vigencia => "vigencia",
        })
    }
}

impl Listable for Prescription {
    type Derived = PrescriptionRow;
    type SortField = PrescriptionSort;

    const FILTER_KEYS: &'static [&'static str] = &["vigencia", "estado", "optometrista", "cliente"];
    const DATE_FIELD: Option<&'static str> = Some("fecha");

    fn id(&self) -> &str {
        &self.id
    }

    fn derive(&self, ctx: &ListContext) -> PrescriptionRow {
        PrescriptionRow {
            client: ctx.references.name_of("clientes", &self.cliente_id),
            optometrist: ctx.references.name_of("empleados", &self.optometrista_id),
            current: self.is_current(ctx.now),
        }
    }

    fn search_fields<'a>(&'a self, derived: &'a PrescriptionRow) -> Vec<&'a str> {
        vec![self.diagnostico.as_str(), derived.client.as_str()]
    }

    fn matches_filter(&self, derived: &PrescriptionRow, key: &str, value: &str) -> bool {
        match key {
            // Exact term in months; a non-numeric value does not constrain.
            "vigencia" => value.trim().parse::<i64>().map_or(true, |months| self.vigencia == months),
            "estado" => match value.to_lowercase().as_str() {
                "vigente" | "vigentes" => derived.current,
                "vencida" | "vencidas" => !derived.current,
                _ => true,
            },
            "optometrista" => {
                ref_id(&self.optometrista_id) == value || same_text(&derived.optometrist, value)
            }
            "cliente" => ref_id(&self.cliente_id) == value || same_text(&derived.client, value),
            _ => true,
        }
    }

    fn date_value(&self) -> Option<DateTime<Utc>> {
        self.fecha
    }

    fn sort_value(&self, derived: &PrescriptionRow, field: PrescriptionSort) -> SortValue {
        match field {
            PrescriptionSort::Fecha => SortValue::date(self.fecha),
            PrescriptionSort::Cliente => SortValue::text(&derived.client),
            PrescriptionSort::Vigencia => SortValue::Number(self.vigencia as f64),
        }
    }
}

pub const FORM_FIELDS: &[(&str, FieldKind)] = &[
    ("clienteId", FieldKind::Text),
    ("optometristaId", FieldKind::Text),
    ("diagnostico", FieldKind::Text),
    ("vigencia", FieldKind::Number),
    ("fecha", FieldKind::Text),
    ("ojoDerecho", FieldKind::Object),
    ("ojoDerecho.esfera", FieldKind::Number),
    ("ojoDerecho.cilindro", FieldKind::Number),
    ("ojoDerecho.eje", FieldKind::Number),
    ("ojoDerecho.adicion", FieldKind::Number),
    ("ojoIzquierdo", FieldKind::Object),
    ("ojoIzquierdo.esfera", FieldKind::Number),
    ("ojoIzquierdo.cilindro", FieldKind::Number),
    ("ojoIzquierdo.eje", FieldKind::Number),
    ("ojoIzquierdo.adicion", FieldKind::Number),
];

pub fn validate(values: &FieldValues, _mode: FormMode) -> ErrorMap {
    Rules::new(values)
        .required("clienteId")
        .required("optometristaId")
        .required("diagnostico")
        .int_range("vigencia", 1, MAX_VALIDITY_MONTHS)
        .range_if_present("ojoDerecho.eje", 0, 180)
        .range_if_present("ojoIzquierdo.eje", 0, 180)
        .finish()
}
