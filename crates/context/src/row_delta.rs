//! Rows harvested from a context's tracking set.

use alloc::vec::Vec;
use tessel_core::Scalar;

/// A snapshot of the rows a context saw change.
///
/// `rows` is row-major with `count` rows; row *i* belongs to `pkeys[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowDelta {
    /// Whether the structure of the view changed since the last harvest
    pub structural_change: bool,
    /// Number of rows in `rows`
    pub count: usize,
    /// Row-major cell values
    pub rows: Vec<Scalar>,
    /// Primary key of each row, in output order
    pub pkeys: Vec<Scalar>,
}

impl RowDelta {
    /// Creates a row delta.
    pub fn new(structural_change: bool, pkeys: Vec<Scalar>, rows: Vec<Scalar>) -> Self {
        Self {
            structural_change,
            count: pkeys.len(),
            rows,
            pkeys,
        }
    }

    /// Returns true if no rows were harvested.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of cells per row.
    pub fn width(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            self.rows.len() / self.count
        }
    }

    /// Returns the cells of row `idx`.
    pub fn row(&self, idx: usize) -> Option<&[Scalar]> {
        if idx >= self.count {
            return None;
        }
        let width = self.width();
        self.rows.get(idx * width..(idx + 1) * width)
    }

    /// Returns the cells of the row with primary key `pkey`.
    pub fn row_for(&self, pkey: &Scalar) -> Option<&[Scalar]> {
        self.pkeys
            .iter()
            .position(|k| k == pkey)
            .and_then(|idx| self.row(idx))
    }
}
