//! Constraint definitions for Cynos database schema.
//!
//! Foreign keys are a DDL/referential-integrity concern and are out of
//! scope here (see the schema catalog's read-only contract); this module
//! keeps only the constraints the query planner and semantic analyzer need
//! to know about: the primary key and not-null columns.

use super::index::IndexDef;
use alloc::string::String;
use alloc::vec::Vec;

/// Table constraints container.
#[derive(Clone, Debug, Default)]
pub struct Constraints {
    /// Primary key index (if any).
    primary_key: Option<IndexDef>,
    /// Columns that cannot be null.
    not_nullable: Vec<String>,
}

impl Constraints {
    /// Creates a new empty constraints container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary key.
    pub fn primary_key(mut self, pk: IndexDef) -> Self {
        self.primary_key = Some(pk);
        self
    }

    /// Adds a not-nullable column.
    pub fn add_not_nullable(mut self, column: impl Into<String>) -> Self {
        self.not_nullable.push(column.into());
        self
    }

    /// Sets the not-nullable columns.
    pub fn not_nullable(mut self, columns: Vec<String>) -> Self {
        self.not_nullable = columns;
        self
    }

    /// Returns the primary key index.
    pub fn get_primary_key(&self) -> Option<&IndexDef> {
        self.primary_key.as_ref()
    }

    /// Returns the not-nullable columns.
    pub fn get_not_nullable(&self) -> &[String] {
        &self.not_nullable
    }
}
