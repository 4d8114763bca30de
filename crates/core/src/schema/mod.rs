//! Schema module for Cynos database.
//!
//! This module contains all schema-related definitions including columns, tables,
//! indices, and constraints.

mod column;
mod constraint;
mod index;
mod table;

pub use column::Column;
pub use constraint::Constraints;
pub use index::{IndexDef, IndexedColumn, Order};
pub use table::{Table, TableBuilder};
