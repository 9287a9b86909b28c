//! Tessel Context - Views over a shared table store.
//!
//! A context is a read-oriented façade over a table store that tracks which
//! rows changed since its last cycle. The store owns the data and pushes each
//! mutation batch to every subscribed context; contexts never write back.
//!
//! # Core Concepts
//!
//! - `TableStore`: The read interface a context needs from its store
//! - `Context`: The lifecycle, notify and read contract shared by all view variants
//! - `UnitContext`: The identity view, which exposes store rows unchanged
//! - `RowDelta`: Rows harvested from a context's tracking set
//!
//! # Cycle
//!
//! ```ignore
//! ctx.step_begin();               // clears the tracking set
//! ctx.notify(&batch)?;            // tracks every mutated primary key
//! ctx.step_end();
//! let delta = ctx.get_row_delta(&store)?;
//! ```

#![no_std]

extern crate alloc;

pub mod context;
pub mod row_delta;
pub mod store;
pub mod unit;

pub use context::Context;
pub use row_delta::RowDelta;
pub use store::TableStore;
pub use unit::UnitContext;

// Re-export commonly used types from dependencies
pub use tessel_core::{DataType, Error, Result, Scalar, Schema, StepBatch, Symbol, SymbolTable};
