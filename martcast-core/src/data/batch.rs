//! Record batches — the tabular unit the pipeline operates on.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered sequence of records sharing a schema.
///
/// Cells are `serde_json::Value`s; `Value::Null` marks a missing value.
/// Column names address cells, row order is preserved through every
/// transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RecordBatch {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Build a single-row batch from one JSON record (the serving path).
    pub fn from_record(record: &serde_json::Map<String, Value>) -> Self {
        let columns: Vec<String> = record.keys().cloned().collect();
        let row: Vec<Value> = columns
            .iter()
            .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        Self {
            columns,
            rows: vec![row],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a column; `values` must hold one cell per row.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), CoreError> {
        if values.len() != self.rows.len() {
            return Err(CoreError::dataset(format!(
                "column length {} does not match row count {}",
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Remove a column, returning whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            if idx < row.len() {
                row.remove(idx);
            }
        }
        true
    }

    /// Remove a column and return its cells.
    pub fn take_column(&mut self, name: &str) -> Option<Vec<Value>> {
        let idx = self.column_index(name)?;
        self.columns.remove(idx);
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &mut self.rows {
            if idx < row.len() {
                values.push(row.remove(idx));
            } else {
                values.push(Value::Null);
            }
        }
        Some(values)
    }

    /// Iterate the cells of one column.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }
}
