//! Cynos Core - Core types and schema definitions for the Cynos query engine.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - `DataType`: the supported value tags (Boolean, Int32, Int64, UInt64, Float64,
//!   Decimal, Text, DateTime, Bytes).
//! - `Value`: runtime values, with both an internal total order (for sorting
//!   and index keys) and a typed SQL comparison (`Value::try_compare`).
//! - `Row`: a row of values with a unique identifier.
//! - `schema`: schema definitions (Column, Table, Index, Constraints).
//! - `Error`: the error taxonomy spanning catalog resolution through execution.
//! - `CancellationToken`: a shared abort flag operators poll cooperatively.
//!
//! # Example
//!
//! ```rust
//! use cynos_core::{DataType, Value, Row};
//! use cynos_core::schema::TableBuilder;
//!
//! // Create a table schema
//! let table = TableBuilder::new("users")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::Text)
//!     .unwrap()
//!     .add_primary_key(&["id"], true)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! // Create a row
//! let row = Row::new(1, vec![
//!     Value::Int64(1),
//!     Value::Text("Alice".into()),
//! ]);
//!
//! assert_eq!(row.id(), 1);
//! assert_eq!(row.get(1), Some(&Value::Text("Alice".into())));
//! assert_eq!(table.name(), "users");
//! ```

#![no_std]

extern crate alloc;

mod cancel;
mod error;
pub mod pattern_match;
mod row;
pub mod schema;
mod types;
mod value;

pub use cancel::{CancelCheck, CancellationToken};
pub use error::{CatalogErrorKind, Error, Result};
pub use row::{next_row_id, reserve_row_ids, set_next_row_id, set_next_row_id_if_greater, Row, RowId, DUMMY_ROW_ID};
pub use types::DataType;
pub use value::{Decimal, Value};
