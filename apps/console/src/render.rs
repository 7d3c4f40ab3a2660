//! # Text Rendering
//!
//! Column definitions per screen and a plain-text table printer.
//!
//! ```text
//!   activas: 2 | programadas: 1 | ...            ◄── summary (some screens)
//!   [error] Connection error. ...                ◄── notification, if any
//!   NOMBRE        MARCA     PRECIO    STOCK
//!   Lente Solar   Ray-Ban   $80.00    12
//!   ...
//!   rows 11-20 of 25 | page 2/3                  ◄── page window
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use optica_core::pipeline::{Listable, Row};
use optica_core::promotion::Promotion;
use optica_core::screen::NotificationKind;
use optica_core::stats::{product_stats, promotion_stats};
use optica_core::types::{Branch, Client, Employee, Prescription, Product, Sale};
use optica_core::ScreenState;
use serde::Serialize;
use serde_json::json;
use unicode_width::UnicodeWidthStr;

use crate::error::ConsoleResult;

// =============================================================================
// Columns
// =============================================================================

/// How a screen's rows are shown as text.
pub trait Tabular: Listable + Sized {
    const HEADERS: &'static [&'static str];

    fn cells(&self, derived: &Self::Derived) -> Vec<String>;

    /// Line printed above the table, computed over every loaded record.
    fn summary(_records: &[Arc<Self>], _now: DateTime<Utc>) -> Option<String> {
        None
    }
}

fn day(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

impl Tabular for Product {
    const HEADERS: &'static [&'static str] = &["NOMBRE", "MARCA", "CATEGORIA", "PRECIO", "BASE", "STOCK"];

    fn cells(&self, derived: &Self::Derived) -> Vec<String> {
        let price = if self.en_promocion {
            format!("{} *", derived.effective_price)
        } else {
            derived.effective_price.to_string()
        };
        vec![
            self.nombre.clone(),
            derived.brand.clone(),
            derived.category.clone(),
            price,
            self.precio_base.to_string(),
            derived.total_stock.to_string(),
        ]
    }

    fn summary(records: &[Arc<Self>], _now: DateTime<Utc>) -> Option<String> {
        let stats = product_stats(records.iter().map(Arc::as_ref));
        Some(format!(
            "productos: {} | en promocion: {} | stock: {} | inventario: {}",
            stats.total, stats.on_promotion, stats.total_stock, stats.inventory_value
        ))
    }
}

impl Tabular for Client {
    const HEADERS: &'static [&'static str] = &["NOMBRE", "EDAD", "DUI", "TELEFONO", "CORREO", "ESTADO"];

    fn cells(&self, full_name: &String) -> Vec<String> {
        vec![
            full_name.clone(),
            self.edad.to_string(),
            self.dui.clone(),
            self.telefono.clone(),
            self.correo.clone(),
            self.estado.clone(),
        ]
    }
}

impl Tabular for Employee {
    const HEADERS: &'static [&'static str] = &["NOMBRE", "CARGO", "SUCURSAL", "SALARIO", "ESTADO"];

    fn cells(&self, derived: &Self::Derived) -> Vec<String> {
        vec![
            derived.full_name.clone(),
            self.cargo.clone(),
            derived.branch.clone(),
            self.salario.to_string(),
            self.estado.clone(),
        ]
    }
}

impl Tabular for Branch {
    const HEADERS: &'static [&'static str] = &["CODIGO", "NOMBRE", "DEPARTAMENTO", "MUNICIPIO", "TELEFONO", "ESTADO"];

    fn cells(&self, _derived: &()) -> Vec<String> {
        vec![
            self.codigo.clone(),
            self.nombre.clone(),
            self.departamento.clone(),
            self.municipio.clone(),
            self.telefono.clone(),
            self.estado.clone(),
        ]
    }
}

impl Tabular for Prescription {
    const HEADERS: &'static [&'static str] = &["FECHA", "CLIENTE", "OPTOMETRISTA", "DIAGNOSTICO", "VIGENCIA", "ESTADO"];

    fn cells(&self, derived: &Self::Derived) -> Vec<String> {
        vec![
            day(self.fecha),
            derived.client.clone(),
            derived.optometrist.clone(),
            self.diagnostico.clone(),
            format!("{} meses", self.vigencia),
            if derived.current { "vigente" } else { "vencida" }.to_string(),
        ]
    }
}

impl Tabular for Sale {
    const HEADERS: &'static [&'static str] = &["FACTURA", "FECHA", "CLIENTE", "SUCURSAL", "EMPLEADO", "ESTADO", "TOTAL"];

    fn cells(&self, derived: &Self::Derived) -> Vec<String> {
        vec![
            self.factura_datos.numero_factura.clone(),
            day(self.fecha),
            self.factura_datos.nombre_cliente.clone(),
            derived.branch.clone(),
            derived.employee.clone(),
            self.estado.clone(),
            self.total.to_string(),
        ]
    }
}

impl Tabular for Promotion {
    const HEADERS: &'static [&'static str] = &["NOMBRE", "CODIGO", "DESCUENTO", "APLICA A", "INICIO", "FIN", "ESTADO"];

    fn cells(&self, status: &Self::Derived) -> Vec<String> {
        vec![
            self.nombre.clone(),
            self.codigo_promo.clone(),
            format!("{} {}", self.tipo_descuento, self.valor_descuento),
            self.aplica_a.as_str().to_string(),
            day(self.fecha_inicio),
            day(self.fecha_fin),
            status.to_string(),
        ]
    }

    fn summary(records: &[Arc<Self>], now: DateTime<Utc>) -> Option<String> {
        let counts = promotion_stats(records.iter().map(Arc::as_ref), now);
        let parts: Vec<String> = counts
            .iter()
            .map(|(status, count)| format!("{}: {}", status.as_str(), count))
            .collect();
        Some(parts.join(" | "))
    }
}

// =============================================================================
// Pages
// =============================================================================

/// Text rendering of the current page window.
pub fn page<T: Tabular>(state: &ScreenState<T>) -> String {
    let view = state.view();
    let mut out = String::new();

    if let Some(summary) = T::summary(state.records(), state.context().now) {
        out.push_str(&summary);
        out.push('\n');
    }

    if let Some(notification) = view.notification {
        let tag = match notification.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
        };
        out.push_str(&format!("[{}] {}\n", tag, notification.message));
    }

    let rows: Vec<Vec<String>> = view.rows.iter().map(cells_of).collect();
    out.push_str(&table(T::HEADERS, &rows));

    let info = view.page;
    if info.total == 0 {
        out.push_str("no records");
    } else {
        out.push_str(&format!(
            "rows {}-{} of {} | page {}/{}",
            info.start + 1,
            info.end,
            info.total,
            info.index + 1,
            info.page_count
        ));
    }
    out
}

/// JSON rendering of the current page window: `{page, rows}`.
pub fn page_json<T: Tabular + Serialize>(state: &ScreenState<T>) -> ConsoleResult<String> {
    let view = state.view();
    let rows: Vec<&T> = view.rows.iter().map(|row| row.record.as_ref()).collect();
    Ok(serde_json::to_string_pretty(&json!({
        "page": view.page,
        "rows": rows,
    }))?)
}

fn cells_of<T: Tabular>(row: &Row<T>) -> Vec<String> {
    row.record.cells(&row.derived)
}

/// Left-aligned columns, two spaces apart, one line per row.
///
/// Widths are terminal cells: combining accents take none, wide glyphs two.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let padding = width.saturating_sub(cell.width());
                format!("{}{}", cell, " ".repeat(padding))
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers.to_vec());
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use optica_core::{ScreenAction, ScreenSettings};
    use chrono::TimeZone;
    use serde_json::Value;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn clients(count: usize) -> Vec<Client> {
        (0..count)
            .map(|i| {
                serde_json::from_value(json!({
                    "_id": format!("c{i}"),
                    "nombre": format!("Cliente{i:02}"),
                    "apellido": "Pérez",
                    "edad": 30 + i,
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_table_aligns_columns() {
        let out = table(
            &["NOMBRE", "EDAD"],
            &[vec!["Ana".into(), "31".into()], vec!["Maximiliano".into(), "7".into()]],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "NOMBRE       EDAD");
        assert_eq!(lines[1], "Ana          31");
        assert_eq!(lines[2], "Maximiliano  7");
    }

    #[test]
    fn test_table_pads_by_display_width() {
        // "José" with a combining acute: five chars, four cells.
        let out = table(
            &["NOMBRE", "CIUDAD"],
            &[
                vec!["Jose\u{301}".into(), "Santa Ana".into()],
                vec!["Óptica 眼鏡".into(), "San Miguel".into()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        let column = |line: &str| {
            let prefix = &line[..line.find("CIUDAD").or_else(|| line.find("San")).unwrap()];
            prefix.width()
        };
        assert_eq!(column(lines[0]), column(lines[1]));
        assert_eq!(column(lines[1]), column(lines[2]));
        assert_eq!(lines[1], "Jose\u{301}         Santa Ana");
    }

    #[test]
    fn test_page_footer() {
        let mut state = ScreenState::<Client>::new(ScreenSettings::default(), now());
        state
            .dispatch(ScreenAction::Loaded {
                records: clients(25),
                at: now(),
            })
            .unwrap();
        state.dispatch(ScreenAction::LastPage).unwrap();

        let out = page(&state);
        assert!(out.ends_with("rows 21-25 of 25 | page 3/3"));
        assert!(out.contains("Cliente24 Pérez"));
        assert!(!out.contains("Cliente00 Pérez"));
    }

    #[test]
    fn test_empty_page_and_notification() {
        let mut state = ScreenState::<Client>::new(ScreenSettings::default(), now());
        state
            .dispatch(ScreenAction::FetchFailed {
                message: "Connection error. Check your network connection.".into(),
                at: now(),
            })
            .unwrap();

        let out = page(&state);
        assert!(out.contains("[error] Connection error."));
        assert!(out.ends_with("no records"));
    }

    #[test]
    fn test_page_json() {
        let mut state = ScreenState::<Client>::new(ScreenSettings::default(), now());
        state
            .dispatch(ScreenAction::Loaded {
                records: clients(3),
                at: now(),
            })
            .unwrap();

        let value: Value = serde_json::from_str(&page_json(&state).unwrap()).unwrap();
        assert_eq!(value["page"]["total"], 3);
        assert_eq!(value["rows"].as_array().unwrap().len(), 3);
        assert_eq!(value["rows"][0]["nombre"], "Cliente00");
    }
}
