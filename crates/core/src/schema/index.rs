//! Index definition for Cynos database schema.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// Sort order for index columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

/// A column reference within an index definition.
#[derive(Clone, Debug)]
pub struct IndexedColumn {
    /// Column name.
    pub name: String,
    /// Sort order for this column in the index.
    pub order: Order,
    /// Whether this column auto-increments (only valid for primary key).
    pub auto_increment: bool,
}

impl IndexedColumn {
    /// Creates a new indexed column with default ascending order.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: Order::Asc,
            auto_increment: false,
        }
    }

    /// Sets the sort order.
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Sets auto-increment flag.
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }
}

/// An index definition in a table schema. The planner consults only this
/// metadata — column order, uniqueness, primary-ness — never a physical
/// index structure.
#[derive(Clone, Debug)]
pub struct IndexDef {
    /// Index name.
    name: String,
    /// Table name this index belongs to.
    table_name: String,
    /// Columns included in this index, in key order.
    columns: Vec<IndexedColumn>,
    /// Whether this index enforces uniqueness.
    unique: bool,
    /// Whether this is the table's primary index. A primary index is
    /// always unique.
    primary: bool,
}

impl IndexDef {
    /// Creates a new index definition.
    pub fn new(name: impl Into<String>, table_name: impl Into<String>, columns: Vec<IndexedColumn>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns,
            unique: false,
            primary: false,
        }
    }

    /// Sets whether this index is unique.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Marks this index as the table's primary index. Implies unique.
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        if primary {
            self.unique = true;
        }
        self
    }

    /// Returns the index name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table name.
    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the normalized name (table.index).
    pub fn normalized_name(&self) -> String {
        format!("{}.{}", self.table_name, self.name)
    }

    /// Returns the indexed columns, in key order.
    #[inline]
    pub fn columns(&self) -> &[IndexedColumn] {
        &self.columns
    }

    /// Returns whether this index is unique.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns whether this is the table's primary index.
    #[inline]
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Returns whether this is a single-column index.
    #[inline]
    pub fn is_single_column(&self) -> bool {
        self.columns.len() == 1
    }

    /// Returns whether any column has auto-increment.
    pub fn has_auto_increment(&self) -> bool {
        self.columns.iter().any(|c| c.auto_increment)
    }

    /// Returns whether every name in `required` appears among this index's
    /// columns, i.e. a scan of this index alone could answer the query
    /// without a base-row lookup.
    pub fn covers(&self, required: &[&str]) -> bool {
        required.iter().all(|r| self.columns.iter().any(|c| c.name == *r))
    }

    /// Returns how many of this index's leading columns are consumed by
    /// `predicate_columns`, stopping at the first column not present in the
    /// set. `predicate_columns` need not be in index order.
    pub fn prefix_match(&self, predicate_columns: &[&str]) -> usize {
        let mut matched = 0;
        for col in &self.columns {
            if predicate_columns.iter().any(|p| *p == col.name) {
                matched += 1;
            } else {
                break;
            }
        }
        matched
    }
}

impl PartialEq for IndexDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table_name == other.table_name
    }
}
