//! Error types for Tessel views and table stores.

use alloc::string::String;
use core::fmt;

/// Result type alias for Tessel operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Tessel operations.
///
/// `ProtocolViolation` and `Unimplemented` are fatal: they mean the caller and
/// the view disagree about the contract, not that the input was bad. They are
/// returned as values like every other error; see [`Error::is_fatal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A mutation batch did not follow the store/view wire contract.
    ProtocolViolation {
        message: String,
    },
    /// The operation is not provided by this view variant.
    Unimplemented {
        operation: &'static str,
    },
    /// Invalid schema definition.
    InvalidSchema {
        message: String,
    },
    /// Column not found.
    ColumnNotFound {
        column: String,
    },
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ProtocolViolation { message } => {
                write!(f, "Protocol violation: {}", message)
            }
            Error::Unimplemented { operation } => {
                write!(f, "Not implemented: {}", operation)
            }
            Error::InvalidSchema { message } => {
                write!(f, "Invalid schema: {}", message)
            }
            Error::ColumnNotFound { column } => {
                write!(f, "Column not found: {}", column)
            }
            Error::InvalidOperation { message } => {
                write!(f, "Invalid operation: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates a protocol violation error.
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Error::ProtocolViolation {
            message: message.into(),
        }
    }

    /// Creates an unimplemented operation error.
    pub fn unimplemented(operation: &'static str) -> Self {
        Error::Unimplemented { operation }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the error means the view and its owner have
    /// desynchronized and the view should not be used further.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ProtocolViolation { .. } | Error::Unimplemented { .. }
        )
    }
}
