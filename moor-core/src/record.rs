use crate::{Column, Error, FromValue, Result, SessionError, Value};
use std::{collections::HashMap, sync::Arc};

/// Owned row value slice, aligned by position with its column descriptors.
pub type Row = Box<[Value]>;

/// One decoded row paired with the column descriptors of the query that
/// produced it.
///
/// Lookup is by column name; the raw driver value is converted through the
/// column's declared [`crate::ColumnType`] before it is returned, so callers
/// never see driver-native representations. Immutable after construction.
#[derive(Debug)]
pub struct Record {
    row: Row,
    columns: Arc<[Column]>,
    positions: HashMap<String, usize>,
}

impl Record {
    pub fn new(row: Row, columns: Arc<[Column]>) -> Self {
        let positions = columns
            .iter()
            .enumerate()
            .map(|(position, column)| (column.name.clone(), position))
            .collect();
        Self {
            row,
            columns,
            positions,
        }
    }

    /// Value of the named column, converted to its declared type.
    pub fn get(&self, column: &str) -> Result<Value> {
        let &position = self
            .positions
            .get(column)
            .ok_or_else(|| SessionError::UnknownColumn(column.to_owned()))?;
        let raw = self
            .row
            .get(position)
            .cloned()
            .ok_or_else(|| Error::msg("Row is narrower than its column set"))?;
        self.columns[position].ty.convert(raw)
    }

    /// Typed value of the named column.
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<T> {
        T::from_value(self.get(column)?)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }
}
