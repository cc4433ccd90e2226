//! Data sources for loading record batches from files.

use crate::data::batch::RecordBatch;
use crate::error::CoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Trait for loading a record batch from somewhere.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load all records, optionally capped at `limit` rows.
    async fn load(&self, limit: Option<usize>) -> Result<RecordBatch, CoreError>;
}

/// CSV file data source with typed cell parsing.
///
/// Cells parse as integer, then float, then boolean; an empty cell becomes
/// null and anything else stays a string.
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: char,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
        }
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn load(&self, limit: Option<usize>) -> Result<RecordBatch, CoreError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::dataset(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let mut lines = content.lines();

        let columns: Vec<String> = lines
            .next()
            .ok_or_else(|| CoreError::dataset(format!("{} is empty", self.path.display())))?
            .split(self.delimiter)
            .map(|s| s.trim().trim_matches('"').to_string())
            .collect();

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(max) = limit {
                if rows.len() >= max {
                    break;
                }
            }
            let row: Vec<Value> = line
                .split(self.delimiter)
                .map(|s| parse_cell(s.trim().trim_matches('"')))
                .collect();
            if row.len() != columns.len() {
                return Err(CoreError::dataset(format!(
                    "{}: row {} has {} cells, expected {}",
                    self.path.display(),
                    rows.len() + 1,
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }

        tracing::debug!(
            path = %self.path.display(),
            rows = rows.len(),
            columns = columns.len(),
            "loaded CSV"
        );
        Ok(RecordBatch { columns, rows })
    }
}

/// JSON file data source: an array of record objects, or a single object
/// treated as a one-row batch.
///
/// Columns are the union of keys across records in first-seen order; a
/// record missing a key gets a null cell.
pub struct JsonSource {
    pub path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for JsonSource {
    async fn load(&self, limit: Option<usize>) -> Result<RecordBatch, CoreError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::dataset(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| CoreError::dataset(format!("{}: {e}", self.path.display())))?;

        let records: Vec<serde_json::Map<String, Value>> = match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(CoreError::dataset(format!(
                        "{}: expected an array of objects, found {other}",
                        self.path.display()
                    ))),
                })
                .collect::<Result<_, _>>()?,
            Value::Object(record) => vec![record],
            other => {
                return Err(CoreError::dataset(format!(
                    "{}: expected an object or array of objects, found {other}",
                    self.path.display()
                )));
            }
        };

        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows: Vec<Vec<Value>> = records
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        tracing::debug!(
            path = %self.path.display(),
            rows = rows.len(),
            columns = columns.len(),
            "loaded JSON"
        );
        Ok(RecordBatch { columns, rows })
    }
}

fn parse_cell(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        return serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(s.to_string()));
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}
