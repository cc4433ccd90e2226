//! Column type inference and per-column summaries.

use crate::data::batch::RecordBatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Unknown,
}

/// Summary statistics for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: ColumnType,
    pub null_count: usize,
    pub distinct_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Infer a column type from its values.
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnType {
    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_string = false;
    let mut non_null = 0usize;

    for v in values {
        match v {
            Value::Number(n) => {
                non_null += 1;
                if n.is_f64() {
                    has_float = true;
                } else {
                    has_int = true;
                }
            }
            Value::Bool(_) => {
                non_null += 1;
                has_bool = true;
            }
            Value::String(_) => {
                non_null += 1;
                has_string = true;
            }
            Value::Null => {}
            _ => {
                non_null += 1;
            }
        }
    }

    if non_null == 0 {
        return ColumnType::Null;
    }
    if has_string {
        return ColumnType::String;
    }
    if has_float {
        return ColumnType::Float;
    }
    if has_int {
        return ColumnType::Integer;
    }
    if has_bool {
        return ColumnType::Boolean;
    }
    ColumnType::Unknown
}

/// Summarize every column of a batch.
pub fn summarize(batch: &RecordBatch) -> Vec<ColumnSummary> {
    batch
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let dtype = infer_column_type(batch.column_values(idx));
            let null_count = batch.column_values(idx).filter(|v| v.is_null()).count();

            let distinct: BTreeSet<String> = batch
                .column_values(idx)
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .collect();

            let numeric: Vec<f64> = batch
                .column_values(idx)
                .filter_map(|v| v.as_f64())
                .collect();
            let (min, max, mean) = if numeric.is_empty() {
                (None, None, None)
            } else {
                let min = numeric.iter().copied().fold(f64::INFINITY, f64::min);
                let max = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = numeric.iter().sum::<f64>() / numeric.len() as f64;
                (Some(min), Some(max), Some(mean))
            };

            ColumnSummary {
                name: name.clone(),
                dtype,
                null_count,
                distinct_count: distinct.len(),
                min,
                max,
                mean,
            }
        })
        .collect()
}
