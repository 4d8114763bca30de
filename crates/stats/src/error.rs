//! Error type for the statistics store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("unknown column: {table}.{column}")]
    UnknownColumn { table: String, column: String },
    #[error("unknown index: {table}.{index}")]
    UnknownIndex { table: String, index: String },
}

pub type Result<T> = core::result::Result<T, StatsError>;
