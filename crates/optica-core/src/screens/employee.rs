//! Employee screen.
//!
//! The password field is write-only: required on create, optional on edit
//! (a blank value keeps the stored one, see [`crate::payload::employee_payload`]).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::field_store::{FieldKind, FieldValues};
use crate::pipeline::{same_text, ListContext, Listable, SortValue};
use crate::types::{ref_id, Employee};
use crate::validation::{is_dui, is_email, is_phone, ErrorMap, FormMode, Rules};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeRow {
    pub full_name: String,
    pub branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSort {
    Nombre,
    Cargo,
    Salario,
    Sucursal,
    Fecha,
}

impl FromStr for EmployeeSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nombre" => Ok(EmployeeSort::Nombre),
            "cargo" => Ok(EmployeeSort::Cargo),
            "salario" => Ok(EmployeeSort::Salario),
            "sucursal" => Ok(EmployeeSort::Sucursal),
            "fecha" | "fechacontratacion" => Ok(EmployeeSort::Fecha),
            _ => Err(CoreError::InvalidSortField { field: s.to_string() }),
        }
    }
}

impl fmt::Display for EmployeeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmployeeSort::Nombre => "nombre",
            EmployeeSort::Cargo => "cargo",
            EmployeeSort::Salario => "salario",
            EmployeeSort::Sucursal => "sucursal",
            EmployeeSort::Fecha => "fecha",
        })
    }
}

impl Listable for Employee {
    type Derived = EmployeeRow;
    type SortField = EmployeeSort;

    const FILTER_KEYS: &'static [&'static str] = &["estado", "cargo", "sucursal"];
    const RANGE_FIELD: Option<&'static str> = Some("salario");
    const DATE_FIELD: Option<&'static str> = Some("fechaContratacion");

    fn id(&self) -> &str {
        &self.id
    }

    fn derive(&self, ctx: &ListContext) -> EmployeeRow {
        EmployeeRow {
            full_name: self.full_name(),
            branch: ctx.references.name_of("sucursales", &self.sucursal_id),
        }
    }

    fn search_fields<'a>(&'a self, derived: &'a EmployeeRow) -> Vec<&'a str> {
        vec![
            derived.full_name.as_str(),
            self.dui.as_str(),
            self.correo.as_str(),
            self.telefono.as_str(),
            self.cargo.as_str(),
            derived.branch.as_str(),
        ]
    }

    fn matches_filter(&self, derived: &EmployeeRow, key: &str, value: &str) -> bool {
        match key {
            // activos / inactivos as offered by the screen, or the raw status
            "estado" => match value.to_lowercase().as_str() {
                "activos" => same_text(&self.estado, "activo"),
                "inactivos" => same_text(&self.estado, "inactivo"),
                other => same_text(&self.estado, other),
            },
            "cargo" => same_text(&self.cargo, value),
            "sucursal" => ref_id(&self.sucursal_id) == value || same_text(&derived.branch, value),
            _ => true,
        }
    }

    fn range_value(&self, _derived: &EmployeeRow) -> f64 {
        self.salario.to_major()
    }

    fn date_value(&self) -> Option<DateTime<Utc>> {
        self.fecha_contratacion
    }

    fn sort_value(&self, derived: &EmployeeRow, field: EmployeeSort) -> SortValue {
        match field {
            EmployeeSort::Nombre => SortValue::text(&derived.full_name),
            EmployeeSort::Cargo => SortValue::text(&self.cargo),
            EmployeeSort::Salario => SortValue::Number(self.salario.to_major()),
            EmployeeSort::Sucursal => SortValue::text(&derived.branch),
            EmployeeSort::Fecha => SortValue::date(self.fecha_contratacion),
        }
    }
}

pub const FORM_FIELDS: &[(&str, FieldKind)] = &[
    ("nombre", FieldKind::Text),
    ("apellido", FieldKind::Text),
    ("dui", FieldKind::Text),
    ("telefono", FieldKind::Text),
    ("correo", FieldKind::Text),
    ("cargo", FieldKind::Text),
    ("sucursalId", FieldKind::Text),
    ("salario", FieldKind::Number),
    ("estado", FieldKind::Text),
    ("password", FieldKind::Text),
];

pub fn validate(values: &FieldValues, mode: FormMode) -> ErrorMap {
    let password_given = !values.text("password").trim().is_empty();

    Rules::new(values)
        .required("nombre")
        .required("apellido")
        .format("dui", is_dui, "expected 12345678-9")
        .format("telefono", is_phone, "expected +503 and 8 digits")
        .format("correo", is_email, "expected name@domain.tld")
        .required("cargo")
        .required("sucursalId")
        .positive("salario")
        .when(mode == FormMode::Create, |r| r.required("password"))
        .when(mode == FormMode::Create || password_given, |r| {
            r.min_len("password", MIN_PASSWORD_LEN)
        })
        .finish()
}
