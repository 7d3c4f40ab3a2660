//! REST endpoint table.
//!
//! The path without its leading slash doubles as the collection name used
//! for reference lookups (`marcas`, `categoria`, `sucursales`, ...).

use std::fmt;

use optica_core::screens::product::Catalog;
use optica_core::ScreenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Aros,
    Lentes,
    Accesorios,
    Clientes,
    Empleados,
    Sucursales,
    Recetas,
    Ventas,
    Promociones,
    Marcas,
    Categorias,
}

impl Endpoint {
    pub const ALL: [Endpoint; 11] = [
        Endpoint::Aros,
        Endpoint::Lentes,
        Endpoint::Accesorios,
        Endpoint::Clientes,
        Endpoint::Empleados,
        Endpoint::Sucursales,
        Endpoint::Recetas,
        Endpoint::Ventas,
        Endpoint::Promociones,
        Endpoint::Marcas,
        Endpoint::Categorias,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Aros => "/aros",
            Endpoint::Lentes => "/lentes",
            Endpoint::Accesorios => "/accesorios",
            Endpoint::Clientes => "/clientes",
            Endpoint::Empleados => "/empleados",
            Endpoint::Sucursales => "/sucursales",
            Endpoint::Recetas => "/recetas",
            Endpoint::Ventas => "/ventas",
            Endpoint::Promociones => "/promociones",
            Endpoint::Marcas => "/marcas",
            Endpoint::Categorias => "/categoria",
        }
    }

    pub fn collection(&self) -> &'static str {
        self.path().trim_start_matches('/')
    }

    /// Endpoint serving a reference collection, if there is one.
    pub fn for_collection(collection: &str) -> Option<Endpoint> {
        Endpoint::ALL.into_iter().find(|e| e.collection() == collection)
    }

    pub fn for_screen(screen: ScreenKind) -> Endpoint {
        match screen {
            ScreenKind::Products(Catalog::Frames) => Endpoint::Aros,
            ScreenKind::Products(Catalog::Lenses) => Endpoint::Lentes,
            ScreenKind::Products(Catalog::Accessories) => Endpoint::Accesorios,
            ScreenKind::Clients => Endpoint::Clientes,
            ScreenKind::Employees => Endpoint::Empleados,
            ScreenKind::Branches => Endpoint::Sucursales,
            ScreenKind::Prescriptions => Endpoint::Recetas,
            ScreenKind::Sales => Endpoint::Ventas,
            ScreenKind::Promotions => Endpoint::Promociones,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_screen_and_reference_has_an_endpoint() {
        for screen in ScreenKind::ALL {
            assert_eq!(Endpoint::for_screen(screen).collection(), screen.name());
            for collection in screen.references() {
                assert!(Endpoint::for_collection(collection).is_some(), "{collection}");
            }
        }
        assert_eq!(Endpoint::Categorias.path(), "/categoria");
    }
}
