//! Branch ("sucursal") screen.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::CoreError;
use crate::field_store::{FieldKind, FieldValues};
use crate::pipeline::{same_text, ListContext, Listable, SortValue};
use crate::types::Branch;
use crate::validation::{is_email, is_phone, ErrorMap, FormMode, Rules};

/// Branches opened after this instant count as recent.
pub fn recent_cutoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSort {
    Nombre,
    Departamento,
    Fecha,
}

impl FromStr for BranchSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nombre" => Ok(BranchSort::Nombre),
            "departamento" => Ok(BranchSort::Departamento),
            "fecha" | "fechaapertura" => Ok(BranchSort::Fecha),
            _ => Err(CoreError::InvalidSortField { field: s.to_string() }),
        }
    }
}

impl fmt::Display for BranchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BranchSort::Nombre => "nombre",
            BranchSort::Departamento => "departamento",
            BranchSort::Fecha => "fecha",
        })
    }
}

impl Listable for Branch {
    type Derived = ();
    type SortField = BranchSort;

    const FILTER_KEYS: &'static [&'static str] = &["estado", "departamento"];
    const DATE_FIELD: Option<&'static str> = Some("fechaApertura");

    fn id(&self) -> &str {
        &self.id
    }

    fn derive(&self, _ctx: &ListContext) {}

    fn search_fields<'a>(&'a self, _derived: &'a ()) -> Vec<&'a str> {
        vec![
            self.nombre.as_str(),
            self.codigo.as_str(),
            self.direccion.as_str(),
            self.municipio.as_str(),
            self.departamento.as_str(),
            self.gerente.as_str(),
        ]
    }

    fn matches_filter(&self, _derived: &(), key: &str, value: &str) -> bool {
        match key {
            "estado" => match value.to_lowercase().as_str() {
                "reciente" | "recientes" => self.fecha_apertura.is_some_and(|d| d > recent_cutoff()),
                other => same_text(&self.estado, other),
            },
            "departamento" => same_text(&self.departamento, value),
            _ => true,
        }
    }

    fn date_value(&self) -> Option<DateTime<Utc>> {
        self.fecha_apertura
    }

    fn sort_value(&self, _derived: &(), field: BranchSort) -> SortValue {
        match field {
            BranchSort::Nombre => SortValue::text(&self.nombre),
            BranchSort::Departamento => SortValue::text(&self.departamento),
            BranchSort::Fecha => SortValue::date(self.fecha_apertura),
        }
    }
}

pub const FORM_FIELDS: &[(&str, FieldKind)] = &[
    ("nombre", FieldKind::Text),
    ("codigo", FieldKind::Text),
    ("direccion", FieldKind::Text),
    ("departamento", FieldKind::Text),
    ("municipio", FieldKind::Text),
    ("telefono", FieldKind::Text),
    ("correo", FieldKind::Text),
    ("gerente", FieldKind::Text),
    ("estado", FieldKind::Text),
    ("horarioApertura", FieldKind::Text),
    ("horarioCierre", FieldKind::Text),
];

pub fn validate(values: &FieldValues, _mode: FormMode) -> ErrorMap {
    Rules::new(values)
        .required("nombre")
        .required("direccion")
        .required("departamento")
        .format("telefono", is_phone, "expected +503 and 8 digits")
        .format("correo", is_email, "expected name@domain.tld")
        .finish()
}
