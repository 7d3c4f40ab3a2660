//! Promotion screen: listing by lifecycle status and the promotion form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, ValidationError};
use crate::field_store::{FieldKind, FieldValues};
use crate::lenient;
use crate::pipeline::{same_text, ListContext, Listable, SortValue};
use crate::promotion::{DiscountKind, Promotion, PromotionScope, PromotionStatus};
use crate::validation::{ErrorMap, FormMode, Rules};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionSort {
    Nombre,
    Valor,
    Inicio,
    Fin,
    Estado,
}

impl FromStr for PromotionSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nombre" => Ok(PromotionSort::Nombre),
            "valor" | "valordescuento" => Ok(PromotionSort::Valor),
            "inicio" | "fechainicio" => Ok(PromotionSort::Inicio),
            "fin" | "fechafin" => Ok(PromotionSort::Fin),
            "estado" => Ok(PromotionSort::Estado),
            _ => Err(CoreError::InvalidSortField { field: s.to_string() }),
        }
    }
}

impl fmt::Display for PromotionSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PromotionSort::Nombre => "nombre",
            PromotionSort::Valor => "valor",
            PromotionSort::Inicio => "inicio",
            PromotionSort::Fin => "fin",
            PromotionSort::Estado => "estado",
        })
    }
}

impl Listable for Promotion {
    type Derived = PromotionStatus;
    type SortField = PromotionSort;

    const FILTER_KEYS: &'static [&'static str] = &["estado", "tipo", "aplicaA"];
    const RANGE_FIELD: Option<&'static str> = Some("valorDescuento");
    const DATE_FIELD: Option<&'static str> = Some("fechaInicio");

    fn id(&self) -> &str {
        &self.id
    }

    fn derive(&self, ctx: &ListContext) -> PromotionStatus {
        self.status(ctx.now)
    }

    fn search_fields<'a>(&'a self, _status: &'a PromotionStatus) -> Vec<&'a str> {
        vec![self.nombre.as_str(), self.descripcion.as_str(), self.codigo_promo.as_str()]
    }

    fn matches_filter(&self, status: &PromotionStatus, key: &str, value: &str) -> bool {
        match key {
            "estado" => same_text(status.as_str(), value) || same_text(status.label(), value),
            "tipo" => same_text(self.tipo_descuento.as_str(), DiscountKind::parse(value).as_str()),
            "aplicaA" => self.aplica_a == PromotionScope::parse(value),
            _ => true,
        }
    }

    fn range_value(&self, _status: &PromotionStatus) -> f64 {
        self.valor_descuento
    }

    fn date_value(&self) -> Option<DateTime<Utc>> {
        self.fecha_inicio
    }

    fn sort_value(&self, status: &PromotionStatus, field: PromotionSort) -> SortValue {
        match field {
            PromotionSort::Nombre => SortValue::text(&self.nombre),
            PromotionSort::Valor => SortValue::Number(self.valor_descuento),
            PromotionSort::Inicio => SortValue::date(self.fecha_inicio),
            PromotionSort::Fin => SortValue::date(self.fecha_fin),
            PromotionSort::Estado => SortValue::text(status.as_str()),
        }
    }
}

pub const FORM_FIELDS: &[(&str, FieldKind)] = &[
    ("nombre", FieldKind::Text),
    ("descripcion", FieldKind::Text),
    ("codigoPromo", FieldKind::Text),
    ("tipoDescuento", FieldKind::Text),
    ("valorDescuento", FieldKind::Number),
    ("aplicaA", FieldKind::Text),
    ("categoriasAplicables", FieldKind::List),
    ("lentesAplicables", FieldKind::List),
    ("fechaInicio", FieldKind::Text),
    ("fechaFin", FieldKind::Text),
    ("activo", FieldKind::Flag),
];

/// Kinds the form offers.
pub const DISCOUNT_KINDS: &[&str] = &["porcentaje", "monto", "2x1"];

pub fn validate(values: &FieldValues, _mode: FormMode) -> ErrorMap {
    let kind = DiscountKind::parse(&values.text("tipoDescuento"));
    let scope = values.text("aplicaA");
    let start = lenient::parse_date(&values.text("fechaInicio"));
    let end = lenient::parse_date(&values.text("fechaFin"));

    Rules::new(values)
        .required("nombre")
        .required("descripcion")
        .required("codigoPromo")
        .required("tipoDescuento")
        .one_of("tipoDescuento", DISCOUNT_KINDS)
        .positive("valorDescuento")
        .when(kind == DiscountKind::Percentage, |r| {
            let over = r.values().number("valorDescuento").is_some_and(|v| v > 100.0);
            r.check(
                over,
                ValidationError::OutOfRange {
                    field: "valorDescuento".to_string(),
                    min: 0,
                    max: 100,
                },
            )
        })
        .required("aplicaA")
        .when(PromotionScope::parse(&scope) == PromotionScope::Categoria, |r| {
            r.non_empty_list("categoriasAplicables", "category")
        })
        .when(PromotionScope::parse(&scope) == PromotionScope::Lente, |r| {
            r.non_empty_list("lentesAplicables", "lens")
        })
        .required("fechaInicio")
        .required("fechaFin")
        .check(
            matches!((start, end), (Some(s), Some(e)) if e <= s),
            ValidationError::MustBeAfter {
                field: "fechaFin".to_string(),
                other: "fechaInicio".to_string(),
            },
        )
        .finish()
}
