//! Data type definitions for Tessel.
//!
//! This module defines the column types a table store can hold.

/// Supported column data types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataType {
    /// No type. Returned for unknown columns and carried by the none scalar.
    #[default]
    None,
    /// Boolean type (true/false)
    Bool,
    /// Unsigned byte, used for wire codes such as operation kinds
    UInt8,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    Str,
    /// Calendar date stored as days since the Unix epoch
    Date,
    /// Timestamp stored as milliseconds since the Unix epoch
    Time,
}

impl DataType {
    /// Returns the lowercase name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::None => "none",
            DataType::Bool => "bool",
            DataType::UInt8 => "uint8",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Str => "str",
            DataType::Date => "date",
            DataType::Time => "time",
        }
    }

    /// Returns true for the `None` type.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, DataType::None)
    }

    /// Returns whether values of this type are numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::UInt8 | DataType::Int32 | DataType::Int64 | DataType::Float64
        )
    }
}
