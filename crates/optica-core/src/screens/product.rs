//! # Product Screens
//!
//! Frames ("aros"), lenses ("lentes") and accessories share one record
//! schema, one listing definition and one validator; the catalog only
//! decides which descriptive fields are mandatory.
//!
//! ## Filters
//! ```text
//! ┌──────────────┬─────────────────────────────────────────────────────┐
//! │ key          │ value                                               │
//! ├──────────────┼─────────────────────────────────────────────────────┤
//! │ marca        │ brand id or brand name                              │
//! │ categoria    │ category id or category name                        │
//! │ promocion    │ en_promocion | sin_promocion | <promotion id>       │
//! │ stock        │ con_stock | sin_stock                               │
//! │ tipoLente    │ lens type (case-insensitive)                        │
//! │ material     │ material (case-insensitive)                         │
//! │ sucursal     │ branch id or name; product must have stock there    │
//! └──────────────┴─────────────────────────────────────────────────────┘
//! min/max bound the effective price; from/to bound fechaCreacion.
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, ValidationError};
use crate::field_store::{FieldKind, FieldValues};
use crate::money::Money;
use crate::pipeline::{same_text, ListContext, Listable, SortValue};
use crate::types::{ref_id, Product};
use crate::validation::{ErrorMap, FormMode, Rules};

/// Which product catalog a screen manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    Frames,
    Lenses,
    Accessories,
}

impl Catalog {
    pub fn label(&self) -> &'static str {
        match self {
            Catalog::Frames => "aros",
            Catalog::Lenses => "lentes",
            Catalog::Accessories => "accesorios",
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Joined names and composites, computed once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductRow {
    pub brand: String,
    pub category: String,
    pub branch_names: Vec<String>,
    pub total_stock: i64,
    pub effective_price: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Nombre,
    Precio,
    Marca,
    Stock,
    Fecha,
}

impl FromStr for ProductSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nombre" => Ok(ProductSort::Nombre),
            "precio" => Ok(ProductSort::Precio),
            "marca" => Ok(ProductSort::Marca),
            "stock" => Ok(ProductSort::Stock),
            "fecha" | "fechacreacion" => Ok(ProductSort::Fecha),
            _ => Err(CoreError::InvalidSortField { field: s.to_string() }),
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProductSort::Nombre => "nombre",
            ProductSort::Precio => "precio",
            ProductSort::Marca => "marca",
            ProductSort::Stock => "stock",
            ProductSort::Fecha => "fecha",
        };
        f.write_str(name)
    }
}

impl Listable for Product {
    type Derived = ProductRow;
    type SortField = ProductSort;

    const FILTER_KEYS: &'static [&'static str] =
        &["marca", "categoria", "promocion", "stock", "tipoLente", "material", "sucursal"];
    const RANGE_FIELD: Option<&'static str> = Some("precio");
    const DATE_FIELD: Option<&'static str> = Some("fechaCreacion");

    fn id(&self) -> &str {
        &self.id
    }

    fn derive(&self, ctx: &ListContext) -> ProductRow {
        let refs = &ctx.references;
        ProductRow {
            brand: refs.name_of("marcas", &self.marca_id),
            category: refs.name_of("categoria", &self.categoria_id),
            branch_names: self
                .sucursales
                .iter()
                .map(|s| {
                    let name = s.branch_name();
                    if name.is_empty() {
                        refs.name_of("sucursales", &s.sucursal_id)
                    } else {
                        name
                    }
                })
                .collect(),
            total_stock: self.total_stock(),
            effective_price: self.effective_price(),
        }
    }

    fn search_fields<'a>(&'a self, derived: &'a ProductRow) -> Vec<&'a str> {
        vec![
            self.nombre.as_str(),
            self.descripcion.as_str(),
            self.material.as_str(),
            self.color.as_str(),
            self.tipo_lente.as_str(),
            self.linea.as_str(),
            derived.category.as_str(),
            derived.brand.as_str(),
        ]
    }

    fn matches_filter(&self, derived: &ProductRow, key: &str, value: &str) -> bool {
        match key {
            "marca" => ref_id(&self.marca_id) == value || same_text(&derived.brand, value),
            "categoria" => ref_id(&self.categoria_id) == value || same_text(&derived.category, value),
            "promocion" => match value.to_lowercase().as_str() {
                "en_promocion" | "con_promocion" | "si" | "true" => self.en_promocion,
                "sin_promocion" | "no" | "false" => !self.en_promocion,
                id => self.en_promocion && ref_id(&self.promocion_id).eq_ignore_ascii_case(id),
            },
            "stock" => match value.to_lowercase().as_str() {
                "con_stock" => derived.total_stock > 0,
                "sin_stock" => derived.total_stock <= 0,
                _ => true,
            },
            "tipoLente" => same_text(&self.tipo_lente, value),
            "material" => same_text(&self.material, value),
            "sucursal" => self.sucursales.iter().zip(&derived.branch_names).any(|(s, name)| {
                s.stock > 0 && (s.branch_id() == value || same_text(name, value))
            }),
            _ => true,
        }
    }

    fn range_value(&self, derived: &ProductRow) -> f64 {
        derived.effective_price.to_major()
    }

    fn date_value(&self) -> Option<DateTime<Utc>> {
        self.fecha_creacion
    }

    fn sort_value(&self, derived: &ProductRow, field: ProductSort) -> SortValue {
        match field {
            ProductSort::Nombre => SortValue::text(&self.nombre),
            ProductSort::Precio => SortValue::Number(derived.effective_price.to_major()),
            ProductSort::Marca => SortValue::text(&derived.brand),
            ProductSort::Stock => SortValue::Number(derived.total_stock as f64),
            ProductSort::Fecha => SortValue::date(self.fecha_creacion),
        }
    }
}

// =============================================================================
// Form
// =============================================================================

/// Declared kinds of the product form fields.
pub const FORM_FIELDS: &[(&str, FieldKind)] = &[
    ("nombre", FieldKind::Text),
    ("descripcion", FieldKind::Text),
    ("categoriaId", FieldKind::Text),
    ("marcaId", FieldKind::Text),
    ("material", FieldKind::Text),
    ("color", FieldKind::Text),
    ("tipoLente", FieldKind::Text),
    ("linea", FieldKind::Text),
    ("precioBase", FieldKind::Number),
    ("precioActual", FieldKind::Number),
    ("enPromocion", FieldKind::Flag),
    ("promocionId", FieldKind::Text),
    ("medidas", FieldKind::Object),
    ("medidas.anchoPuente", FieldKind::Number),
    ("medidas.altura", FieldKind::Number),
    ("medidas.ancho", FieldKind::Number),
    ("imagenes", FieldKind::List),
    ("sucursales", FieldKind::List),
];

/// Product form rules for one catalog.
pub fn validator(catalog: Catalog) -> impl Fn(&FieldValues, FormMode) -> ErrorMap {
    move |values, _mode| validate(catalog, values)
}

pub fn validate(catalog: Catalog, values: &FieldValues) -> ErrorMap {
    let on_promotion = values.flag("enPromocion");
    let base = values.number("precioBase").unwrap_or(0.0);
    let actual = values.number("precioActual");

    let branches = values.list("sucursales");
    let negative_stock = branches.iter().any(|entry| {
        entry
            .get("stock")
            .and_then(crate::lenient::value_as_f64)
            .is_some_and(|s| s < 0.0)
    });

    Rules::new(values)
        .required("nombre")
        .required("descripcion")
        .required("categoriaId")
        .required("marcaId")
        .when(catalog != Catalog::Accessories, |r| r.required("material").required("color"))
        .when(catalog == Catalog::Lenses, |r| r.required("tipoLente").required("linea"))
        .positive("precioBase")
        .when(on_promotion, |r| {
            r.required("promocionId")
                .positive("precioActual")
                .check(
                    actual.is_some_and(|a| a > 0.0 && a >= base),
                    ValidationError::MustBeLessThan {
                        field: "precioActual".to_string(),
                        other: "precioBase".to_string(),
                    },
                )
        })
        .positive_if_present("medidas.anchoPuente")
        .positive_if_present("medidas.altura")
        .positive_if_present("medidas.ancho")
        .non_empty_list("imagenes", "image")
        .non_empty_list("sucursales", "branch")
        .check(
            negative_stock,
            ValidationError::Negative {
                field: "sucursales".to_string(),
            },
        )
        .finish()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{self, FilterSpec, SortKey};
    use crate::reference::ReferenceTable;
    use crate::types::{BranchStock, Ref, ReferenceItem};
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Arc;

    const CENTRO: &str = "64b7f0c2a1b2c3d4e5f60718";

    fn ctx() -> ListContext {
        let refs = ReferenceTable::new()
            .with("marcas", vec![ReferenceItem { id: "m1".into(), nombre: "Ray-Ban".into() }])
            .with("sucursales", vec![ReferenceItem { id: CENTRO.into(), nombre: "Centro".into() }]);
        ListContext::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()).with_references(refs)
    }

    fn product(id: &str, nombre: &str, base: i64, stock: i64) -> Arc<Product> {
        Arc::new(Product {
            id: id.into(),
            nombre: nombre.into(),
            precio_base: Money::from_cents(base),
            precio_actual: Money::from_cents(base),
            sucursales: vec![BranchStock {
                sucursal_id: Some(Ref::id_only(CENTRO)),
                stock,
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    fn ids(rows: &[pipeline::Row<Product>]) -> Vec<&str> {
        rows.iter().map(|r| r.record.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_name_then_min_price() {
        let records = vec![product("b", "B", 2000, 1), product("a", "A", 1000, 1)];
        let key = SortKey::asc(ProductSort::Nombre);
        let rows = pipeline::run(&records, &ctx(), "", &FilterSpec::new(), Some(&key));
        assert_eq!(ids(&rows), vec!["a", "b"]);

        let mut spec = FilterSpec::new();
        spec.set_range(Some(15.0), None);
        let rows = pipeline::run(&records, &ctx(), "", &spec, Some(&key));
        assert_eq!(ids(&rows), vec!["b"]);
    }

    #[test]
    fn test_search_matches_joined_brand_name() {
        let mut with_brand = (*product("x", "Aviador", 1000, 1)).clone();
        with_brand.marca_id = Some(Ref::id_only("m1"));
        let records = vec![Arc::new(with_brand), product("y", "Redondo", 1000, 1)];
        let rows = pipeline::run(&records, &ctx(), "ray-", &FilterSpec::new(), None);
        assert_eq!(ids(&rows), vec!["x"]);
    }

    #[test]
    fn test_promotion_and_stock_filters() {
        let mut promo = (*product("p", "Promo", 1000, 0)).clone();
        promo.en_promocion = true;
        promo.precio_actual = Money::from_cents(800);
        promo.promocion_id = Some(Ref::id_only("promo1"));
        let records = vec![Arc::new(promo), product("q", "Normal", 1000, 3)];

        let run = |spec: FilterSpec| ids(&pipeline::run(&records, &ctx(), "", &spec, None)).join(",");
        assert_eq!(run(FilterSpec::new().with("promocion", "en_promocion")), "p");
        assert_eq!(run(FilterSpec::new().with("promocion", "sin_promocion")), "q");
        assert_eq!(run(FilterSpec::new().with("promocion", "promo1")), "p");
        assert_eq!(run(FilterSpec::new().with("stock", "con_stock")), "q");
        assert_eq!(run(FilterSpec::new().with("stock", "sin_stock")), "p");
        assert_eq!(run(FilterSpec::new().with("sucursal", "centro")), "q");
        assert_eq!(run(FilterSpec::new().with("stock", "todos")), "p,q");
    }

    #[test]
    fn test_price_sort_uses_effective_price() {
        let mut promo = (*product("p", "Promo", 5000, 1)).clone();
        promo.en_promocion = true;
        promo.precio_actual = Money::from_cents(500);
        let records = vec![product("q", "Normal", 1000, 1), Arc::new(promo)];
        let rows = pipeline::run(&records, &ctx(), "", &FilterSpec::new(), Some(&SortKey::asc(ProductSort::Precio)));
        assert_eq!(ids(&rows), vec!["p", "q"]);
    }

    fn valid_lens() -> serde_json::Value {
        json!({
            "nombre": "Progresivo",
            "descripcion": "Lente progresivo",
            "categoriaId": "c1",
            "marcaId": "m1",
            "material": "Policarbonato",
            "color": "Transparente",
            "tipoLente": "progresivo",
            "linea": "Premium",
            "precioBase": 120,
            "enPromocion": false,
            "imagenes": ["https://cdn/a.jpg"],
            "sucursales": [{ "sucursalId": CENTRO, "stock": 3 }]
        })
    }

    #[test]
    fn test_valid_lens_passes() {
        let values = FieldValues::from_value(valid_lens());
        assert_eq!(validate(Catalog::Lenses, &values), ErrorMap::new());
    }

    #[test]
    fn test_promotion_requires_lower_charged_price() {
        let mut raw = valid_lens();
        raw["enPromocion"] = json!(true);
        raw["precioActual"] = json!(150);
        let errors = validate(Catalog::Lenses, &FieldValues::from_value(raw));
        assert!(errors.contains("promocionId"));
        assert_eq!(errors.get("precioActual"), Some("precioActual must be less than precioBase"));
    }

    #[test]
    fn test_stock_and_images_rules() {
        let mut raw = valid_lens();
        raw["imagenes"] = json!([]);
        raw["sucursales"] = json!([{ "sucursalId": CENTRO, "stock": -1 }]);
        raw["medidas"] = json!({ "ancho": 0 });
        let errors = validate(Catalog::Lenses, &FieldValues::from_value(raw));
        assert!(errors.contains("imagenes"));
        assert_eq!(errors.get("sucursales"), Some("sucursales cannot be negative"));
        assert!(errors.contains("medidas.ancho"));
        assert!(!errors.contains("medidas.altura"));
    }

    #[test]
    fn test_accessories_skip_lens_fields() {
        let mut raw = valid_lens();
        raw["tipoLente"] = json!("");
        raw["material"] = json!("");
        assert!(validate(Catalog::Accessories, &FieldValues::from_value(raw.clone())).is_empty());
        let errors = validate(Catalog::Lenses, &FieldValues::from_value(raw));
        assert!(errors.contains("tipoLente"));
        assert!(errors.contains("material"));
    }
}
