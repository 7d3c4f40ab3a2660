//! Sales ("ventas") listing. Sales are created at the point of sale, so this
//! screen only lists, filters and inspects them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::pipeline::{same_text, ListContext, Listable, SortValue};
use crate::types::{ref_id, Sale};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleRow {
    pub branch: String,
    pub employee: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleSort {
    Fecha,
    Total,
    Cliente,
    Estado,
}

impl FromStr for SaleSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fecha" => Ok(SaleSort::Fecha),
            "total" => Ok(SaleSort::Total),
            "cliente" => Ok(SaleSort::Cliente),
            "estado" => Ok(SaleSort::Estado),
            _ => Err(CoreError::InvalidSortField { field: s.to_string() }),
        }
    }
}

impl fmt::Display for SaleSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SaleSort::Fecha => "fecha",
            SaleSort::Total => "total",
            SaleSort::Cliente => "cliente",
            SaleSort::Estado => "estado",
        })
    }
}

impl Listable for Sale {
    type Derived = SaleRow;
    type SortField = SaleSort;

    const FILTER_KEYS: &'static [&'static str] = &["estado", "sucursal", "empleado"];
    const RANGE_FIELD: Option<&'static str> = Some("total");
    const DATE_FIELD: Option<&'static str> = Some("fecha");

    fn id(&self) -> &str {
        &self.id
    }

    fn derive(&self, ctx: &ListContext) -> SaleRow {
        SaleRow {
            branch: ctx.references.name_of("sucursales", &self.sucursal_id),
            employee: ctx.references.name_of("empleados", &self.empleado_id),
        }
    }

    fn search_fields<'a>(&'a self, derived: &'a SaleRow) -> Vec<&'a str> {
        vec![
            self.factura_datos.numero_factura.as_str(),
            self.factura_datos.nombre_cliente.as_str(),
            derived.branch.as_str(),
            derived.employee.as_str(),
        ]
    }

    fn matches_filter(&self, derived: &SaleRow, key: &str, value: &str) -> bool {
        match key {
            "estado" => same_text(&self.estado, value),
            "sucursal" => ref_id(&self.sucursal_id) == value || same_text(&derived.branch, value),
            "empleado" => ref_id(&self.empleado_id) == value || same_text(&derived.employee, value),
            _ => true,
        }
    }

    fn range_value(&self, _derived: &SaleRow) -> f64 {
        self.total.to_major()
    }

    fn date_value(&self) -> Option<DateTime<Utc>> {
        self.fecha
    }

    fn sort_value(&self, _derived: &SaleRow, field: SaleSort) -> SortValue {
        match field {
            SaleSort::Fecha => SortValue::date(self.fecha),
            SaleSort::Total => SortValue::Number(self.total.to_major()),
            SaleSort::Cliente => SortValue::text(&self.factura_datos.nombre_cliente),
            SaleSort::Estado => SortValue::text(&self.estado),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{self, FilterSpec, SortKey};
    use crate::types::{InvoiceData, Ref, RefDoc};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn sale(id: &str, factura: &str, cliente: &str, estado: &str, total: f64) -> Arc<Sale> {
        let raw = serde_json::json!({
            "_id": id,
            "estado": estado,
            "total": total,
            "facturaDatos": { "numeroFactura": factura, "nombreCliente": cliente },
            "sucursalId": { "_id": "s1", "nombre": "Centro" },
            "empleadoId": { "_id": "e1", "nombre": "Luis", "apellido": "Mejía" }
        });
        Arc::new(serde_json::from_value(raw).unwrap())
    }

    #[test]
    fn test_decoded_sale_joins_populated_names() {
        let s = sale("1", "F-001", "Ana", "completada", 45.5);
        assert_eq!(
            s.factura_datos,
            InvoiceData {
                numero_factura: "F-001".into(),
                nombre_cliente: "Ana".into(),
                dui_cliente: String::new(),
            }
        );
        assert_eq!(
            s.empleado_id,
            Some(Ref::Populated(RefDoc {
                id: "e1".into(),
                nombre: "Luis".into(),
                apellido: "Mejía".into(),
            }))
        );
    }

    #[test]
    fn test_search_filter_and_sort() {
        let records = vec![
            sale("1", "F-001", "Ana", "completada", 45.5),
            sale("2", "F-002", "Beto", "pendiente", 120.0),
            sale("3", "F-003", "Carla", "completada", 80.0),
        ];
        let ctx = ListContext::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());

        let rows = pipeline::run(&records, &ctx, "luis mej", &FilterSpec::new(), None);
        assert_eq!(rows.len(), 3);

        let spec = FilterSpec::new().with("estado", "completada").with("sucursal", "centro");
        let rows = pipeline::run(&records, &ctx, "", &spec, Some(&SortKey::desc(SaleSort::Total)));
        let ids: Vec<_> = rows.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);

        let rows = pipeline::run(&records, &ctx, "f-002", &FilterSpec::new(), None);
        assert_eq!(rows[0].record.id, "2");
    }
}
