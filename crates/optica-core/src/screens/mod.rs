//! # Management Screens
//!
//! Per-screen listing definitions ([`Listable`](crate::pipeline::Listable)
//! impls with their sort fields and filter keys), form field kinds and
//! validators.
//!
//! ```text
//! ┌───────────────┬────────────────┬──────────────────────────────────────┐
//! │ screen        │ record         │ reference tables joined              │
//! ├───────────────┼────────────────┼──────────────────────────────────────┤
//! │ aros          │ Product        │ marcas, categoria, sucursales        │
//! │ lentes        │ Product        │ marcas, categoria, sucursales        │
//! │ accesorios    │ Product        │ marcas, categoria, sucursales        │
//! │ clientes      │ Client         │ -                                    │
//! │ empleados     │ Employee       │ sucursales                           │
//! │ sucursales    │ Branch         │ -                                    │
//! │ recetas       │ Prescription   │ clientes, empleados                  │
//! │ ventas        │ Sale           │ sucursales, empleados                │
//! │ promociones   │ Promotion      │ -                                    │
//! └───────────────┴────────────────┴──────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

pub mod branch;
pub mod client;
pub mod employee;
pub mod prescription;
pub mod product;
pub mod promotion;
pub mod sale;

use product::Catalog;

/// Every management screen of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Products(Catalog),
    Clients,
    Employees,
    Branches,
    Prescriptions,
    Sales,
    Promotions,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 9] = [
        ScreenKind::Products(Catalog::Frames),
        ScreenKind::Products(Catalog::Lenses),
        ScreenKind::Products(Catalog::Accessories),
        ScreenKind::Clients,
        ScreenKind::Employees,
        ScreenKind::Branches,
        ScreenKind::Prescriptions,
        ScreenKind::Sales,
        ScreenKind::Promotions,
    ];

    /// Screen name, which is also its collection name.
    pub fn name(&self) -> &'static str {
        match self {
            ScreenKind::Products(catalog) => catalog.label(),
            ScreenKind::Clients => "clientes",
            ScreenKind::Employees => "empleados",
            ScreenKind::Branches => "sucursales",
            ScreenKind::Prescriptions => "recetas",
            ScreenKind::Sales => "ventas",
            ScreenKind::Promotions => "promociones",
        }
    }

    /// Reference collections loaded alongside the records.
    pub fn references(&self) -> &'static [&'static str] {
        match self {
            ScreenKind::Products(_) => &["marcas", "categoria", "sucursales"],
            ScreenKind::Employees => &["sucursales"],
            ScreenKind::Prescriptions => &["clientes", "empleados"],
            ScreenKind::Sales => &["sucursales", "empleados"],
            ScreenKind::Clients | ScreenKind::Branches | ScreenKind::Promotions => &[],
        }
    }
}

impl FromStr for ScreenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ScreenKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| format!("unknown screen '{}'", s.trim()))
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
