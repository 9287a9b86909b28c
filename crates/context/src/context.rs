//! The contract shared by every view variant.
//!
//! A table store notifies a heterogeneous set of contexts through this trait,
//! so every variant accepts the same batch shapes even when it ignores parts
//! of them. Variants differ in how they shape rows; `sidedness` tells a
//! renderer which shape to expect (0 for flat, 1 for grouped rows, 2 for
//! grouped rows and columns).

use crate::row_delta::RowDelta;
use crate::store::TableStore;
use alloc::string::String;
use alloc::vec::Vec;
use tessel_core::{DataTable, DataType, Result, Scalar, StepBatch};

/// A view over a table store that tracks changed rows.
///
/// Write phase: `init`, `step_begin`, `notify_initial`, `notify`, `step_end`.
/// Read phase: everything else. The two must not interleave.
pub trait Context {
    /// Marks the context initialized. Idempotent.
    fn init(&mut self);

    fn is_initialized(&self) -> bool;

    /// Opens a processing cycle.
    fn step_begin(&mut self);

    /// Closes a processing cycle.
    fn step_end(&mut self);

    /// Receives the batch that first populated the store.
    fn notify_initial(&mut self, flattened: &DataTable) -> Result<()>;

    /// Receives a steady-state mutation batch.
    ///
    /// Fails with `Error::ProtocolViolation` if the batch does not follow the
    /// store's wire encoding.
    fn notify(&mut self, batch: &StepBatch) -> Result<()>;

    fn get_row_count(&self, store: &dyn TableStore) -> usize;

    fn get_column_count(&self, store: &dyn TableStore) -> usize;

    /// Reads a clipped rectangle as a row-major buffer.
    fn get_data(
        &self,
        store: &dyn TableStore,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Result<Vec<Scalar>>;

    /// Reads whole rows by position, in input order.
    fn get_data_by_indices(&self, store: &dyn TableStore, rows: &[usize]) -> Result<Vec<Scalar>>;

    /// Reads whole rows by primary key, in input order.
    fn get_data_by_pkeys(&self, store: &dyn TableStore, pkeys: &[Scalar]) -> Result<Vec<Scalar>>;

    /// Returns the primary keys behind `(row, column)` cells.
    fn get_pkeys(&self, cells: &[(usize, usize)]) -> Result<Vec<Scalar>>;

    /// Returns the name of column `idx`, or an empty string.
    fn get_column_name(&self, idx: usize) -> String;

    fn get_column_names(&self) -> Vec<String>;

    /// Returns the type of column `idx`, or `DataType::None`.
    fn get_column_dtype(&self, store: &dyn TableStore, idx: usize) -> DataType;

    /// Harvests the tracked rows.
    fn get_row_delta(&mut self, store: &dyn TableStore) -> Result<RowDelta>;

    fn has_deltas(&self) -> bool;

    fn get_deltas_enabled(&self) -> bool;

    /// Clears the structural-change flag.
    fn reset(&mut self);

    /// Clears the structural-change flag.
    fn clear_deltas(&mut self);

    fn sidedness(&self) -> usize;

    /// Debug identity string.
    fn repr(&self) -> String;
}
