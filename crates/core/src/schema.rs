//! Ordered column name to type mapping.

use crate::error::{Error, Result};
use crate::types::DataType;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// An immutable, ordered list of `(column name, data type)` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    types: Vec<DataType>,
}

impl Schema {
    /// Creates a schema from `(name, type)` pairs.
    ///
    /// Fails if a name is empty or repeated.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<String>,
    {
        let mut builder = Self::builder();
        for (name, dt) in columns {
            builder = builder.column(name, dt)?;
        }
        Ok(builder.build())
    }

    /// Returns a builder for a new schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Returns the column names in order.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the column types in order.
    #[inline]
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Returns the position of a column.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the type of a column, or `DataType::None` if it is unknown.
    pub fn get_dtype(&self, name: &str) -> DataType {
        self.get_column_index(name)
            .map(|idx| self.types[idx])
            .unwrap_or(DataType::None)
    }
}

/// Builder for [`Schema`].
#[derive(Default)]
pub struct SchemaBuilder {
    columns: Vec<String>,
    types: Vec<DataType>,
}

impl SchemaBuilder {
    /// Appends a column.
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_schema("Column name cannot be empty"));
        }
        if self.columns.contains(&name) {
            return Err(Error::invalid_schema(format!("Duplicate column: {}", name)));
        }
        self.columns.push(name);
        self.types.push(data_type);
        Ok(self)
    }

    pub fn build(self) -> Schema {
        Schema {
            columns: self.columns,
            types: self.types,
        }
    }
}
