//! Execution context for query planning.
//!
//! [`ExecutionContext`] is the snapshot of schema and statistics the planner
//! consults while choosing a physical plan. It is built once per plan call
//! from the real [`SchemaCatalog`] and [`StatsStore`] (see
//! [`ExecutionContext::from_catalog_and_stats`]) so that optimizer passes can
//! stay synchronous and context-free to call, without reaching back into
//! storage mid-optimization.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use cynos_stats::{ColumnStats, IndexStats};
use cynos_storage::SchemaCatalog;

/// Index type visible to the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QueryIndexType {
    /// B+Tree index - O(log n) range queries.
    #[default]
    BTree,
}

/// Statistics about a table for query optimization.
#[derive(Clone, Debug, Default)]
pub struct TableStats {
    /// Number of rows in the table.
    pub row_count: usize,
    /// Whether the table is sorted by primary key.
    pub is_sorted: bool,
    /// Available indexes on this table.
    pub indexes: Vec<IndexInfo>,
}

/// Information about an index.
#[derive(Clone, Debug)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Column names in the index, in order.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    pub is_unique: bool,
    /// Whether this is the table's primary index.
    pub is_primary: bool,
    /// Index type.
    pub index_type: QueryIndexType,
}

impl IndexInfo {
    /// Creates a new index info with default BTree type, not primary.
    pub fn new(name: impl Into<String>, columns: Vec<String>, is_unique: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            is_unique,
            is_primary: false,
            index_type: QueryIndexType::BTree,
        }
    }

    /// Marks this index as the table's primary index.
    pub fn primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// Execution context providing access to table metadata and statistics.
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    /// Table statistics for optimization.
    table_stats: BTreeMap<String, TableStats>,
    /// Per-column statistics, keyed by (table, column), for selectivity
    /// estimation in the index-pushdown scoring pass.
    column_stats: BTreeMap<(String, String), ColumnStats>,
    /// Per-index statistics, keyed by (table, index).
    index_stats: BTreeMap<(String, String), IndexStats>,
}

impl ExecutionContext {
    /// Creates a new empty execution context.
    pub fn new() -> Self {
        Self {
            table_stats: BTreeMap::new(),
            column_stats: BTreeMap::new(),
            index_stats: BTreeMap::new(),
        }
    }

    /// Builds a context by reading table/index definitions from the catalog
    /// and statistics (row counts, column/index selectivity) from the stats
    /// store. Called once per `plan()` so the rest of the pipeline sees a
    /// consistent, synchronous snapshot.
    ///
    /// Column and index statistics are pulled through `StatsStore::collect_*`
    /// rather than `get_*`, so a cold cache still gives the index-pushdown
    /// pass a real (possibly synthetic-fallback) number instead of leaving
    /// it permanently blind until some other path happens to warm the cache.
    pub fn from_catalog_and_stats(catalog: &dyn SchemaCatalog, stats: &cynos_stats::StatsStore) -> Self {
        let mut ctx = Self::new();
        for table_name in catalog.table_names() {
            let Ok(table) = catalog.table(table_name) else { continue };
            let row_count = stats.get_table(table_name).map(|s| s.row_count as usize).unwrap_or(0);
            let indexes = table
                .indices()
                .iter()
                .map(|idx| {
                    let columns: Vec<String> = idx.columns().iter().map(|c| c.name.clone()).collect();
                    IndexInfo::new(idx.name(), columns, idx.is_unique()).primary(idx.is_primary())
                })
                .collect();
            ctx.register_table(
                table_name,
                TableStats {
                    row_count,
                    is_sorted: false,
                    indexes,
                },
            );

            for column in table.columns() {
                let column_stats = stats.collect_column(table_name, column.name());
                ctx.register_column_stats(table_name, column.name(), column_stats);
            }
            for idx in table.indices() {
                let index_stats = stats.collect_index(table_name, idx.name());
                ctx.register_index_stats(table_name, idx.name(), index_stats);
            }
        }
        ctx
    }

    /// Registers table statistics.
    pub fn register_table(&mut self, table: impl Into<String>, stats: TableStats) {
        self.table_stats.insert(table.into(), stats);
    }

    /// Registers statistics for a single column.
    pub fn register_column_stats(&mut self, table: impl Into<String>, column: impl Into<String>, stats: ColumnStats) {
        self.column_stats.insert((table.into(), column.into()), stats);
    }

    /// Registers statistics for a single index.
    pub fn register_index_stats(&mut self, table: impl Into<String>, index: impl Into<String>, stats: IndexStats) {
        self.index_stats.insert((table.into(), index.into()), stats);
    }

    /// Gets statistics for a table.
    pub fn get_stats(&self, table: &str) -> Option<&TableStats> {
        self.table_stats.get(table)
    }

    /// Gets statistics for a column, if registered.
    pub fn column_stats(&self, table: &str, column: &str) -> Option<&ColumnStats> {
        self.column_stats.get(&(String::from(table), String::from(column)))
    }

    /// Gets statistics for an index, if registered.
    pub fn index_stats(&self, table: &str, index: &str) -> Option<&IndexStats> {
        self.index_stats.get(&(String::from(table), String::from(index)))
    }

    /// Gets the row count for a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.table_stats
            .get(table)
            .map(|s| s.row_count)
            .unwrap_or(0)
    }

    /// Checks if a table has an index on the given columns (as a prefix).
    pub fn has_index(&self, table: &str, columns: &[&str]) -> bool {
        self.find_index(table, columns).is_some()
    }

    /// Finds an index whose leading columns match the given columns, in order.
    pub fn find_index(&self, table: &str, columns: &[&str]) -> Option<&IndexInfo> {
        self.table_stats.get(table).and_then(|s| {
            s.indexes.iter().find(|idx| {
                idx.columns.len() >= columns.len()
                    && idx
                        .columns
                        .iter()
                        .zip(columns.iter())
                        .all(|(a, b)| a == *b)
            })
        })
    }

    /// Returns every index on a table, for the scoring-based index pushdown pass.
    pub fn indexes(&self, table: &str) -> &[IndexInfo] {
        self.table_stats.get(table).map(|s| s.indexes.as_slice()).unwrap_or(&[])
    }

    /// Finds the primary key index (unique BTree index) for a table.
    /// Returns the first unique index found, which is typically the primary key.
    pub fn find_primary_index(&self, table: &str) -> Option<&IndexInfo> {
        self.table_stats.get(table).and_then(|s| s.indexes.iter().find(|idx| idx.is_unique))
    }
}
