//! Read interface a context consumes from its table store.

use alloc::vec::Vec;
use tessel_core::{Result, Scalar};

/// A shared columnar store that contexts read from.
///
/// Every `read_column*` method clears `out` and fills it with exactly one
/// scalar per requested row. Rows that do not exist are filled with invalid
/// scalars rather than reported as errors; an unknown column name is an error.
pub trait TableStore {
    /// Returns the number of live rows.
    fn num_rows(&self) -> usize;

    /// Returns the number of data columns.
    fn num_columns(&self) -> usize;

    /// Reads rows `[start, end)` of a column.
    fn read_column(&self, name: &str, start: usize, end: usize, out: &mut Vec<Scalar>)
        -> Result<()>;

    /// Reads the given row positions of a column, in order.
    fn read_column_by_indices(&self, name: &str, rows: &[usize], out: &mut Vec<Scalar>)
        -> Result<()>;

    /// Reads the rows with the given primary keys, in order.
    fn read_column_by_pkeys(&self, name: &str, pkeys: &[Scalar], out: &mut Vec<Scalar>)
        -> Result<()>;
}
