//! Error types for Cynos database.

use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;
use core::fmt;

/// Result type alias for Cynos operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Cynos database operations, spanning the full query
/// pipeline from catalog resolution through execution.
#[derive(Debug)]
pub enum Error {
    /// The (external) SQL parser rejected the input text.
    ParseError { message: String },
    /// Unknown schema, table, column, or an ambiguous column reference.
    CatalogError { kind: CatalogErrorKind },
    /// Operand types cannot be compared, combined, or cast.
    TypeError { message: String },
    /// Evaluation failed for a reason other than typing (division by zero,
    /// invalid function argument, malformed LIKE pattern).
    EvaluationError { message: String },
    /// A row-source / storage collaborator failed; message is opaque to the
    /// core (it does not interpret storage-layer causes).
    StorageError { message: String },
    /// The caller's abort signal fired.
    Canceled,
    /// An internal invariant was violated; indicates a bug in this crate.
    Internal { message: String },

    /// Type mismatch error.
    TypeMismatch { expected: DataType, got: DataType },
    /// Null constraint violation.
    NullConstraint { column: String },
    /// Unique constraint violation.
    UniqueConstraint { column: String, value: Value },
    /// Row or record not found.
    NotFound { table: String, key: Value },
    /// Invalid schema definition.
    InvalidSchema { message: String },
    /// Column not found.
    ColumnNotFound { table: String, column: String },
    /// Table not found.
    TableNotFound { name: String },
    /// Index not found.
    IndexNotFound { table: String, index: String },
    /// Invalid operation.
    InvalidOperation { message: String },
}

/// Catalog resolution failure kinds (semantic-analysis stage).
#[derive(Debug)]
pub enum CatalogErrorKind {
    UnknownTable { name: String },
    UnknownColumn { table: String, column: String },
    AmbiguousColumn { column: String },
    UnsupportedConstruct { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseError { message } => write!(f, "parse error: {}", message),
            Error::CatalogError { kind } => write!(f, "catalog error: {}", kind),
            Error::TypeError { message } => write!(f, "type error: {}", message),
            Error::EvaluationError { message } => write!(f, "evaluation error: {}", message),
            Error::StorageError { message } => write!(f, "storage error: {}", message),
            Error::Canceled => write!(f, "query canceled"),
            Error::Internal { message } => write!(f, "internal error: {}", message),
            Error::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {:?}, got {:?}", expected, got)
            }
            Error::NullConstraint { column } => {
                write!(f, "null constraint violation on column: {}", column)
            }
            Error::UniqueConstraint { column, value } => {
                write!(f, "unique constraint violation on column {}: {:?}", column, value)
            }
            Error::NotFound { table, key } => write!(f, "not found in table {}: {:?}", table, key),
            Error::InvalidSchema { message } => write!(f, "invalid schema: {}", message),
            Error::ColumnNotFound { table, column } => {
                write!(f, "column {} not found in table {}", column, table)
            }
            Error::TableNotFound { name } => write!(f, "table not found: {}", name),
            Error::IndexNotFound { table, index } => {
                write!(f, "index {} not found in table {}", index, table)
            }
            Error::InvalidOperation { message } => write!(f, "invalid operation: {}", message),
        }
    }
}

impl fmt::Display for CatalogErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogErrorKind::UnknownTable { name } => write!(f, "unknown table: {}", name),
            CatalogErrorKind::UnknownColumn { table, column } => {
                write!(f, "unknown column {} in table {}", column, table)
            }
            CatalogErrorKind::AmbiguousColumn { column } => {
                write!(f, "ambiguous column reference: {}", column)
            }
            CatalogErrorKind::UnsupportedConstruct { message } => {
                write!(f, "unsupported construct: {}", message)
            }
        }
    }
}

impl Error {
    pub fn type_mismatch(expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch { expected, got }
    }

    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint { column: column.into() }
    }

    pub fn unique_constraint(column: impl Into<String>, value: Value) -> Self {
        Error::UniqueConstraint { column: column.into(), value }
    }

    pub fn not_found(table: impl Into<String>, key: Value) -> Self {
        Error::NotFound { table: table.into(), key }
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema { message: message.into() }
    }

    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound { table: table.into(), column: column.into() }
    }

    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation { message: message.into() }
    }

    pub fn unknown_table(name: impl Into<String>) -> Self {
        Error::CatalogError { kind: CatalogErrorKind::UnknownTable { name: name.into() } }
    }

    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::CatalogError {
            kind: CatalogErrorKind::UnknownColumn { table: table.into(), column: column.into() },
        }
    }

    pub fn ambiguous_column(column: impl Into<String>) -> Self {
        Error::CatalogError { kind: CatalogErrorKind::AmbiguousColumn { column: column.into() } }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::CatalogError {
            kind: CatalogErrorKind::UnsupportedConstruct { message: message.into() },
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Error::TypeError { message: message.into() }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::EvaluationError { message: message.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Error::StorageError { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal { message: message.into() }
    }

    /// True for errors that a caller may reasonably want to distinguish from
    /// ordinary query failures (used by executors deciding whether to keep
    /// partial results around after a cancel).
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }
}
