//! Tessel Storage - In-memory table store for Tessel contexts.
//!
//! This crate provides the table store that owns row data and feeds views:
//!
//! - `GState`: Columnar store keyed by primary key, implementing `TableStore`
//! - `Mutation`: Upsert/delete requests applied in batches
//! - `ContextRegistry`: Weak fan-out list of subscribed contexts
//!
//! # Example
//!
//! ```rust
//! use tessel_storage::{GState, Mutation};
//! use tessel_context::Context;
//! use tessel_core::{DataType, Scalar, Schema};
//!
//! let schema = Schema::new(vec![("a", DataType::Int64), ("b", DataType::Str)]).unwrap();
//! let mut gstate = GState::new(schema, DataType::Int64);
//! let ctx = gstate.make_unit_context();
//!
//! gstate
//!     .process(vec![Mutation::upsert(1i64, vec![Scalar::from(1i64), Scalar::from("x")])])
//!     .unwrap();
//!
//! let delta = ctx.borrow_mut().get_row_delta(&gstate).unwrap();
//! assert_eq!(delta.count, 1);
//! ```

#![no_std]

extern crate alloc;

pub mod gstate;
pub mod mutation;
pub mod registry;

pub use gstate::GState;
pub use mutation::Mutation;
pub use registry::{ContextId, ContextRegistry};
