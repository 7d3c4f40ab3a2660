//! Read-only lookup tables (brands, categories, branches) fetched once per
//! screen mount and joined into rows for display and search.

use std::collections::HashMap;

use crate::types::{Ref, ReferenceItem};

/// Catalog of the reference collections a screen joins against.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    names: HashMap<String, HashMap<String, String>>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        ReferenceTable::default()
    }

    /// Installs (or replaces) one collection, e.g. `"marcas"`.
    pub fn insert(&mut self, collection: &str, items: Vec<ReferenceItem>) {
        let names = items
            .into_iter()
            .filter(|item| !item.id.is_empty())
            .map(|item| (item.id, item.nombre))
            .collect();
        self.names.insert(collection.to_string(), names);
    }

    pub fn with(mut self, collection: &str, items: Vec<ReferenceItem>) -> Self {
        self.insert(collection, items);
        self
    }

    pub fn lookup(&self, collection: &str, id: &str) -> Option<&str> {
        self.names
            .get(collection)
            .and_then(|names| names.get(id))
            .map(String::as_str)
    }

    /// Display name for a reference: the populated name when the backend
    /// sent one, else the table entry, else empty.
    pub fn name_of(&self, collection: &str, reference: &Option<Ref>) -> String {
        let Some(reference) = reference else {
            return String::new();
        };
        reference
            .display_name()
            .or_else(|| self.lookup(collection, reference.id()).map(str::to_string))
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.names.get(collection).map(HashMap::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefDoc;

    fn item(id: &str, nombre: &str) -> ReferenceItem {
        ReferenceItem {
            id: id.into(),
            nombre: nombre.into(),
        }
    }

    #[test]
    fn test_name_of_prefers_populated_reference() {
        let table = ReferenceTable::new().with("marcas", vec![item("m1", "Oakley")]);

        let bare = Some(Ref::id_only("m1"));
        assert_eq!(table.name_of("marcas", &bare), "Oakley");

        let populated = Some(Ref::Populated(RefDoc {
            id: "m1".into(),
            nombre: "Ray-Ban".into(),
            apellido: String::new(),
        }));
        assert_eq!(table.name_of("marcas", &populated), "Ray-Ban");

        assert_eq!(table.name_of("marcas", &Some(Ref::id_only("zz"))), "");
        assert_eq!(table.name_of("marcas", &None), "");
    }

    #[test]
    fn test_insert_skips_items_without_id() {
        let table = ReferenceTable::new().with("categoria", vec![item("", "x"), item("c1", "Sol")]);
        assert_eq!(table.len("categoria"), 1);
    }
}
