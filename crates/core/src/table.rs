//! Row-aligned tables exchanged between a table store and its views.

use crate::error::{Error, Result};
use crate::op::Op;
use crate::scalar::Scalar;
use crate::schema::Schema;
use crate::types::DataType;
use alloc::format;
use alloc::vec::Vec;

/// Name of the primary key column of a flattened batch.
pub const PKEY_COLUMN: &str = "psp_pkey";
/// Name of the operation code column of a flattened batch.
pub const OP_COLUMN: &str = "psp_op";

/// A small column-major table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTable {
    schema: Schema,
    columns: Vec<Vec<Scalar>>,
    num_rows: usize,
}

impl DataTable {
    /// Creates an empty table with the given schema.
    pub fn new(schema: Schema) -> Self {
        let columns = (0..schema.len()).map(|_| Vec::new()).collect();
        Self {
            schema,
            columns,
            num_rows: 0,
        }
    }

    /// Creates an empty flattened batch: `psp_pkey`, `psp_op`, then the data
    /// columns of `data`.
    pub fn flattened(pkey_type: DataType, data: &Schema) -> Result<Self> {
        let mut builder = Schema::builder()
            .column(PKEY_COLUMN, pkey_type)?
            .column(OP_COLUMN, DataType::UInt8)?;
        for (name, dt) in data.columns().iter().zip(data.types()) {
            builder = builder.column(name.clone(), *dt)?;
        }
        Ok(Self::new(builder.build()))
    }

    /// Creates a table from whole columns, which must all have equal length.
    pub fn from_columns(schema: Schema, columns: Vec<Vec<Scalar>>) -> Result<Self> {
        if columns.len() != schema.len() {
            return Err(Error::invalid_operation(format!(
                "expected {} columns, got {}",
                schema.len(),
                columns.len()
            )));
        }
        let num_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        if columns.iter().any(|c| c.len() != num_rows) {
            return Err(Error::invalid_operation("columns have unequal lengths"));
        }
        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// Appends one row.
    pub fn push_row(&mut self, row: Vec<Scalar>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::invalid_operation(format!(
                "row has {} values, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
        self.num_rows += 1;
        Ok(())
    }

    /// Appends one row to a flattened batch.
    pub fn push_flattened(&mut self, pkey: Scalar, op: Op, mut values: Vec<Scalar>) -> Result<()> {
        values.insert(0, Scalar::from(op.code()));
        values.insert(0, pkey);
        self.push_row(values)
    }

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the number of rows.
    #[inline]
    pub fn size(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Returns a column by name.
    pub fn get_column(&self, name: &str) -> Option<&[Scalar]> {
        self.schema
            .get_column_index(name)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Returns a column by name, failing if it is absent.
    pub fn get_const_column(&self, name: &str) -> Result<&[Scalar]> {
        self.get_column(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Returns a single cell.
    pub fn get_scalar(&self, col: usize, row: usize) -> Option<&Scalar> {
        self.columns.get(col).and_then(|c| c.get(row))
    }
}

/// The six row-aligned tables describing one steady-state mutation batch.
///
/// Only `flattened` is needed to track which rows changed. The other tables
/// describe per-cell value transitions for views that aggregate or pivot.
#[derive(Clone, Debug, Default)]
pub struct StepBatch {
    /// Primary key, op code and new values of each mutated row
    pub flattened: DataTable,
    /// Numeric difference between current and previous values
    pub delta: DataTable,
    /// Values before the batch
    pub prev: DataTable,
    /// Values after the batch
    pub curr: DataTable,
    /// `ValueTransition` code per cell
    pub transitions: DataTable,
    /// Whether each row existed before the batch
    pub existed: DataTable,
}

impl StepBatch {
    /// Creates a batch whose auxiliary tables are empty.
    pub fn new(flattened: DataTable) -> Self {
        Self {
            flattened,
            ..Default::default()
        }
    }
}
