//! The schema catalog: the read-only collaborator the semantic analyzer and
//! the physical planner consult to resolve table/column/index names and to
//! reach the row sources a query actually scans.
//!
//! Per the planner-storage contract, the catalog is read-only from the
//! planner's point of view — it is populated up front (typically at engine
//! construction time) and never mutated mid-query.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use cynos_core::schema::{IndexDef, Table};
use cynos_core::{Error, Result};

use crate::row_store::RowStore;

/// Read-only catalog access the planner is allowed: schema lookups only,
/// never a path to mutate a table's definition.
pub trait SchemaCatalog {
    fn table(&self, name: &str) -> Result<&Table>;
    fn table_names(&self) -> Vec<&str>;
    fn index(&self, table: &str, index: &str) -> Result<&IndexDef> {
        let table = self.table(table)?;
        table
            .get_index(index)
            .ok_or_else(|| Error::IndexNotFound { table: table.name().to_string(), index: index.to_string() })
    }
}

/// An in-memory catalog backed by one [`RowStore`] per table — the row
/// source the pull-model executor scans and the schema the planner resolves
/// names against share the same underlying map.
pub struct InMemoryCatalog {
    tables: BTreeMap<String, RowStore>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self { tables: BTreeMap::new() }
    }

    pub fn create_table(&mut self, schema: Table) -> Result<()> {
        let name = schema.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(Error::invalid_schema(alloc::format!("table {} already exists", name)));
        }
        self.tables.insert(name, RowStore::new(schema));
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables.remove(name).map(|_| ()).ok_or_else(|| Error::table_not_found(name))
    }

    pub fn row_store(&self, name: &str) -> Result<&RowStore> {
        self.tables.get(name).ok_or_else(|| Error::table_not_found(name))
    }

    pub fn row_store_mut(&mut self, name: &str) -> Result<&mut RowStore> {
        self.tables.get_mut(name).ok_or_else(|| Error::table_not_found(name))
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn total_row_count(&self) -> usize {
        self.tables.values().map(|t| t.len()).sum()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCatalog for InMemoryCatalog {
    fn table(&self, name: &str) -> Result<&Table> {
        self.tables.get(name).map(|t| t.schema()).ok_or_else(|| Error::unknown_table(name))
    }

    fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cynos_core::schema::TableBuilder;
    use cynos_core::DataType;

    fn schema(name: &str) -> Table {
        TableBuilder::new(name).unwrap().add_column("id", DataType::Int64).unwrap().add_primary_key(&["id"], false).unwrap().build().unwrap()
    }

    #[test]
    fn test_create_and_lookup_table() {
        let mut cat = InMemoryCatalog::new();
        cat.create_table(schema("users")).unwrap();
        assert!(cat.table("users").is_ok());
        assert_eq!(cat.table_count(), 1);
    }

    #[test]
    fn test_duplicate_create_fails() {
        let mut cat = InMemoryCatalog::new();
        cat.create_table(schema("users")).unwrap();
        assert!(cat.create_table(schema("users")).is_err());
    }

    #[test]
    fn test_unknown_table_is_catalog_error() {
        let cat = InMemoryCatalog::new();
        match cat.table("ghost") {
            Err(Error::CatalogError { .. }) => {}
            other => panic!("expected CatalogError, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_table() {
        let mut cat = InMemoryCatalog::new();
        cat.create_table(schema("users")).unwrap();
        cat.drop_table("users").unwrap();
        assert!(cat.table("users").is_err());
    }
}
