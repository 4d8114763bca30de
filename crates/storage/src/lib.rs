//! Cynos Storage - the in-memory schema catalog and row source the query
//! engine plans and executes against.
//!
//! - [`catalog::InMemoryCatalog`]: read-only (from the planner's point of
//!   view) table registry, implementing [`catalog::SchemaCatalog`].
//! - [`row_store::RowStore`]: per-table row storage with primary key and
//!   secondary index maintenance.
//! - [`cursor::Cursor`] / [`cursor::RowSource`]: the scan contract the
//!   pull-model executor drives, returning rows in physical order for a
//!   table scan or index-key order for an index scan.
//! - [`key_range::KeyRange`]: the bound an index scan is narrowed to.
//!
//! # Example
//!
//! ```rust
//! use cynos_storage::{InMemoryCatalog, ScanRequest, RowSource};
//! use cynos_core::schema::TableBuilder;
//! use cynos_core::{DataType, Row, Value};
//!
//! let schema = TableBuilder::new("users")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::Text)
//!     .unwrap()
//!     .add_primary_key(&["id"], false)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut catalog = InMemoryCatalog::new();
//! catalog.create_table(schema).unwrap();
//! catalog.row_store_mut("users").unwrap()
//!     .insert(Row::new(1, vec![Value::Int64(1), Value::Text("Alice".into())]))
//!     .unwrap();
//!
//! let mut cursor = catalog.open(ScanRequest::Table { table: "users" }).unwrap();
//! assert!(cursor.next().unwrap().is_some());
//! assert!(cursor.next().unwrap().is_none());
//! ```

#![no_std]

extern crate alloc;

pub mod catalog;
pub mod cursor;
pub mod key_range;
pub mod row_store;

pub use catalog::{InMemoryCatalog, SchemaCatalog};
pub use cursor::{Cursor, RowSource, ScanRequest};
pub use key_range::KeyRange;
pub use row_store::{BTreeIndexStore, IndexStore, RowStore};
