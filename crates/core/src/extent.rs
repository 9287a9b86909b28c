//! Clipped row/column rectangles for bulk reads.

use core::ops::Range;

/// A `[start_row, end_row) x [start_col, end_col)` rectangle that lies within
/// a table of known shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Extent {
    /// Clips a requested rectangle against a `num_rows x num_columns` table.
    ///
    /// Ends are clamped to the table shape and starts to their ends, so an
    /// inverted or out-of-range request yields an empty extent.
    pub fn sanitize(
        num_rows: usize,
        num_columns: usize,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Self {
        let end_row = end_row.min(num_rows);
        let end_col = end_col.min(num_columns);
        Self {
            start_row: start_row.min(end_row),
            end_row,
            start_col: start_col.min(end_col),
            end_col,
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.end_row - self.start_row
    }

    /// Width of the extent, which is the stride of a row-major buffer.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.end_col - self.start_col
    }

    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    #[inline]
    pub fn cols(&self) -> Range<usize> {
        self.start_col..self.end_col
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0 || self.num_columns() == 0
    }
}
