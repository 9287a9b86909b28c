//! Scalar cell values.
//!
//! A `Scalar` is a tagged payload plus a validity bit. Column stores hand back
//! invalid scalars for null cells and for rows they cannot find; views replace
//! those with [`Scalar::none`] before returning data.

use crate::types::DataType;
use alloc::string::{String, ToString};
use core::fmt;
use core::hash::{Hash, Hasher};

/// The typed payload of a scalar.
#[derive(Clone, Debug)]
pub enum Value {
    /// No payload
    None,
    /// Boolean value
    Bool(bool),
    /// Unsigned byte
    UInt8(u8),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// UTF-8 string
    Str(String),
    /// Days since the Unix epoch
    Date(i32),
    /// Milliseconds since the Unix epoch
    Time(i64),
}

impl Value {
    /// Returns the data type of this payload.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::None => DataType::None,
            Value::Bool(_) => DataType::Bool,
            Value::UInt8(_) => DataType::UInt8,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Float64(_) => DataType::Float64,
            Value::Str(_) => DataType::Str,
            Value::Date(_) => DataType::Date,
            Value::Time(_) => DataType::Time,
        }
    }

    /// Creates the zero payload for the given data type.
    pub fn default_for_type(dt: DataType) -> Self {
        match dt {
            DataType::None => Value::None,
            DataType::Bool => Value::Bool(false),
            DataType::UInt8 => Value::UInt8(0),
            DataType::Int32 => Value::Int32(0),
            DataType::Int64 => Value::Int64(0),
            DataType::Float64 => Value::Float64(0.0),
            DataType::Str => Value::Str(String::new()),
            DataType::Date => Value::Date(0),
            DataType::Time => Value::Time(0),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::UInt8(a), Value::UInt8(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => {
                // NaN keys must intern to a single symbol
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::None => {}
            Value::Bool(b) => b.hash(state),
            Value::UInt8(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float64(f) => {
                if f.is_nan() {
                    f64::NAN.to_bits().hash(state)
                } else if *f == 0.0 {
                    0.0f64.to_bits().hash(state)
                } else {
                    f.to_bits().hash(state)
                }
            }
            Value::Str(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Time(t) => t.hash(state),
        }
    }
}

/// A single cell value with a type tag and a validity bit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scalar {
    value: Value,
    valid: bool,
}

impl Scalar {
    /// Creates a valid scalar from a payload.
    #[inline]
    pub fn new(value: Value) -> Self {
        Self { value, valid: true }
    }

    /// The none sentinel, standing for both null and "value unavailable".
    ///
    /// The sentinel itself is valid; it is what readers return in place of
    /// invalid cells.
    #[inline]
    pub fn none() -> Self {
        Self {
            value: Value::None,
            valid: true,
        }
    }

    /// A typed null, as stored by a column for a missing cell.
    pub fn invalid(dt: DataType) -> Self {
        Self {
            value: Value::default_for_type(dt),
            valid: false,
        }
    }

    /// Returns the payload.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the data type of the payload.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.value.data_type()
    }

    /// Returns the validity bit.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns true if this is the none sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.valid && matches!(self.value, Value::None)
    }

    /// Replaces this scalar with `other`.
    #[inline]
    pub fn set(&mut self, other: Scalar) {
        *self = other;
    }

    /// Returns this scalar, or the none sentinel if it is invalid.
    #[inline]
    pub fn or_none(self) -> Self {
        if self.valid {
            self
        } else {
            Self::none()
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match (&self.value, self.valid) {
            (Value::Bool(v), true) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match (&self.value, self.valid) {
            (Value::UInt8(v), true) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match (&self.value, self.valid) {
            (Value::Int64(v), true) => Some(*v),
            (Value::Int32(v), true) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match (&self.value, self.valid) {
            (Value::Float64(v), true) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match (&self.value, self.valid) {
            (Value::Str(v), true) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return write!(f, "null");
        }
        match &self.value {
            Value::None => write!(f, "none"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "date({})", v),
            Value::Time(v) => write!(f, "time({})", v),
        }
    }
}

impl From<Value> for Scalar {
    fn from(v: Value) -> Self {
        Scalar::new(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::new(Value::Bool(v))
    }
}

impl From<u8> for Scalar {
    fn from(v: u8) -> Self {
        Scalar::new(Value::UInt8(v))
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::new(Value::Int32(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::new(Value::Int64(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::new(Value::Float64(v))
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::new(Value::Str(v))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::new(Value::Str(v.to_string()))
    }
}
