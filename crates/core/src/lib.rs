//! Tessel Core - Core types shared by the Tessel table store and its views.
//!
//! This crate provides the foundational types for the Tessel view layer:
//!
//! - `DataType`: Column types, including the `None` type used as a sentinel
//! - `Scalar`: A tagged, possibly-invalid cell value
//! - `Schema`: Ordered column name to type mapping
//! - `Extent`: Row/column rectangle clipped against a live table shape
//! - `SymbolTable`: Interner mapping primary keys to canonical `Symbol` handles
//! - `Op` / `ValueTransition`: Wire codes carried by mutation batches
//! - `DataTable` / `StepBatch`: Row-aligned tables passed from the store to views
//! - `Error`: Error types for view and store operations
//!
//! # Example
//!
//! ```rust
//! use tessel_core::{DataType, Scalar, Schema, SymbolTable};
//!
//! let schema = Schema::builder()
//!     .column("a", DataType::Int64)
//!     .unwrap()
//!     .column("b", DataType::Str)
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(schema.columns(), &["a", "b"]);
//!
//! let symbols = SymbolTable::new();
//! let k1 = symbols.intern(&Scalar::from(1i64));
//! let k2 = symbols.intern(&Scalar::from(1i64));
//! assert_eq!(k1, k2);
//! ```

#![no_std]

extern crate alloc;

mod error;
mod extent;
mod op;
mod scalar;
mod schema;
mod symbol;
mod table;
mod types;

pub use error::{Error, Result};
pub use extent::Extent;
pub use op::{Op, ValueTransition};
pub use scalar::{Scalar, Value};
pub use schema::{Schema, SchemaBuilder};
pub use symbol::{Symbol, SymbolTable};
pub use table::{DataTable, StepBatch, OP_COLUMN, PKEY_COLUMN};
pub use types::DataType;
