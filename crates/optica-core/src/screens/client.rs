//! Client screen: listing by name, DUI or contact data, and the client form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::field_store::{FieldKind, FieldValues};
use crate::pipeline::{same_text, ListContext, Listable, SortValue};
use crate::types::Client;
use crate::validation::{is_dui, is_email, is_phone, ErrorMap, FormMode, Rules};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSort {
    Nombre,
    Edad,
    Fecha,
}

impl FromStr for ClientSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nombre" => Ok(ClientSort::Nombre),
            "edad" => Ok(ClientSort::Edad),
            "fecha" | "fecharegistro" => Ok(ClientSort::Fecha),
            _ => Err(CoreError::InvalidSortField { field: s.to_string() }),
        }
    }
}

impl fmt::Display for ClientSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClientSort::Nombre => "nombre",
            ClientSort::Edad => "edad",
            ClientSort::Fecha => "fecha",
        })
    }
}

impl Listable for Client {
    /// Full name.
    type Derived = String;
    type SortField = ClientSort;

    const FILTER_KEYS: &'static [&'static str] = &["estado", "departamento", "ciudad"];
    const RANGE_FIELD: Option<&'static str> = Some("edad");
    const DATE_FIELD: Option<&'static str> = Some("fechaRegistro");

    fn id(&self) -> &str {
        &self.id
    }

    fn derive(&self, _ctx: &ListContext) -> String {
        self.full_name()
    }

    fn search_fields<'a>(&'a self, full_name: &'a String) -> Vec<&'a str> {
        vec![
            full_name.as_str(),
            self.dui.as_str(),
            self.correo.as_str(),
            self.telefono.as_str(),
            self.direccion.ciudad.as_str(),
        ]
    }

    fn matches_filter(&self, _derived: &String, key: &str, value: &str) -> bool {
        match key {
            "estado" => same_text(&self.estado, value),
            "departamento" => same_text(&self.direccion.departamento, value),
            "ciudad" => same_text(&self.direccion.ciudad, value),
            _ => true,
        }
    }

    fn range_value(&self, _derived: &String) -> f64 {
        self.edad as f64
    }

    fn date_value(&self) -> Option<DateTime<Utc>> {
        self.fecha_registro
    }

    fn sort_value(&self, full_name: &String, field: ClientSort) -> SortValue {
        match field {
            ClientSort::Nombre => SortValue::text(full_name),
            ClientSort::Edad => SortValue::Number(self.edad as f64),
            ClientSort::Fecha => SortValue::date(self.fecha_registro),
        }
    }
}

pub const FORM_FIELDS: &[(&str, FieldKind)] = &[
    ("nombre", FieldKind::Text),
    ("apellido", FieldKind::Text),
    ("edad", FieldKind::Number),
    ("dui", FieldKind::Text),
    ("telefono", FieldKind::Text),
    ("correo", FieldKind::Text),
    ("direccion", FieldKind::Object),
    ("direccion.calle", FieldKind::Text),
    ("direccion.ciudad", FieldKind::Text),
    ("direccion.departamento", FieldKind::Text),
    ("estado", FieldKind::Text),
];

pub fn validate(values: &FieldValues, _mode: FormMode) -> ErrorMap {
    Rules::new(values)
        .required("nombre")
        .required("apellido")
        .int_range("edad", 1, 120)
        .format("dui", is_dui, "expected 12345678-9")
        .format("telefono", is_phone, "expected +503 and 8 digits")
        .format("correo", is_email, "expected name@domain.tld")
        .required("direccion.calle")
        .required("direccion.ciudad")
        .required("direccion.departamento")
        .finish()
}
