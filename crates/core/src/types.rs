//! Data type definitions for Cynos database.
//!
//! This module defines the supported data types that can be stored in the database.

/// Supported data types in Cynos database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// 64-bit floating point number
    Float64,
    /// Fixed-point decimal, scaled by a power of ten.
    Decimal,
    /// UTF-8 text
    Text,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
    /// Binary data
    Bytes,
}

impl DataType {
    /// Returns the default value for this data type as a string representation.
    pub fn default_value_repr(&self) -> &'static str {
        match self {
            DataType::Boolean => "false",
            DataType::Int32 => "0",
            DataType::Int64 => "0",
            DataType::UInt64 => "0",
            DataType::Float64 => "0.0",
            DataType::Decimal => "0.0",
            DataType::Text => "\"\"",
            DataType::DateTime => "0",
            DataType::Bytes => "[]",
        }
    }

    /// Returns whether this type is nullable by default.
    pub fn is_nullable_by_default(&self) -> bool {
        matches!(self, DataType::Bytes)
    }

    /// Returns whether this type can be used as an index key.
    pub fn is_indexable(&self) -> bool {
        !matches!(self, DataType::Bytes)
    }

    /// Returns whether this type is numeric (comparable across numeric tags).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::UInt64 | DataType::Float64 | DataType::Decimal
        )
    }

    /// Fixed estimated width in bytes used by the cost model's average-row-size
    /// calculation. `Text` has no fixed width; callers fall back to `max_length`
    /// or a conservative default.
    pub fn fixed_width(&self) -> Option<u32> {
        match self {
            DataType::Boolean => Some(1),
            DataType::Int32 => Some(4),
            DataType::Int64 => Some(8),
            DataType::UInt64 => Some(8),
            DataType::Float64 => Some(8),
            DataType::Decimal => Some(8),
            DataType::DateTime => Some(8),
            DataType::Text => None,
            DataType::Bytes => None,
        }
    }
}
