//! Feature-transformation pipeline for item/outlet sales records.
//!
//! Converts raw, possibly-incomplete record batches into the fixed-width
//! numeric matrix the regressor consumes. A fit run derives the
//! [`PipelineState`] (categorical encoders plus the canonical output column
//! layout) from a training batch; an apply run reproduces the exact same
//! transformation from that state, tolerating unseen categories and absent
//! one-hot columns.
//!
//! The transformation steps run in a fixed order; each step depends on the
//! shape produced by the previous one.

pub mod encoder;
pub mod store;

pub use encoder::{CategoricalEncoder, EncoderTable, UNSEEN_CODE};
pub use store::{ArtifactStore, FsArtifactStore, PipelineState};

use crate::data::RecordBatch;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const ITEM_IDENTIFIER: &str = "Item_Identifier";
pub const ITEM_WEIGHT: &str = "Item_Weight";
pub const ITEM_FAT_CONTENT: &str = "Item_Fat_Content";
pub const ITEM_VISIBILITY: &str = "Item_Visibility";
pub const ITEM_TYPE: &str = "Item_Type";
pub const OUTLET_IDENTIFIER: &str = "Outlet_Identifier";
pub const OUTLET_ESTABLISHMENT_YEAR: &str = "Outlet_Establishment_Year";
pub const OUTLET_SIZE: &str = "Outlet_Size";
pub const OUTLET_LOCATION_TYPE: &str = "Outlet_Location_Type";
pub const OUTLET_TYPE: &str = "Outlet_Type";

/// Label column, present only in training data.
pub const LABEL: &str = "Item_Outlet_Sales";

/// Derived categorical field: the first two characters of the item
/// identifier (`"FDA15"` → `"FD"`).
pub const ITEM_CATEGORY: &str = "Item_Category";

/// Engineered interaction column.
pub const VISIBILITY_BY_WEIGHT: &str = "Visibility_by_Weight";

/// Fields every input record must carry.
pub const REQUIRED_FIELDS: [&str; 10] = [
    ITEM_IDENTIFIER,
    ITEM_WEIGHT,
    ITEM_FAT_CONTENT,
    ITEM_VISIBILITY,
    ITEM_TYPE,
    OUTLET_IDENTIFIER,
    OUTLET_ESTABLISHMENT_YEAR,
    OUTLET_SIZE,
    OUTLET_LOCATION_TYPE,
    OUTLET_TYPE,
];

/// Fields label-encoded against the persisted encoder table.
const ENCODED_FIELDS: [&str; 5] = [
    ITEM_FAT_CONTENT,
    OUTLET_LOCATION_TYPE,
    OUTLET_SIZE,
    OUTLET_TYPE,
    ITEM_CATEGORY,
];

/// Dense numeric matrix produced by the pipeline. Row order matches the
/// input batch; in apply mode the column layout always equals the fitted
/// [`PipelineState::feature_columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The values of one named column, if present.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

/// Result of a fit run: the transformed matrix, the label vector when the
/// batch carried one, and the state apply runs need.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub matrix: FeatureMatrix,
    pub labels: Option<Vec<f64>>,
    pub state: PipelineState,
}

/// Fit the pipeline on a training batch.
///
/// Builds fresh categorical encoders from the batch and records the output
/// column layout. Persisting the returned state is the caller's
/// responsibility ([`PipelineState::save`]); a fit whose state is never
/// persisted cannot be reproduced at inference time.
pub fn fit_transform(batch: &RecordBatch) -> Result<FitOutcome, CoreError> {
    validate_schema(batch)?;
    let mut batch = batch.clone();

    expand_item_type(&mut batch)?;
    impute(&mut batch)?;
    normalize_fat_content(&mut batch)?;
    derive_item_category(&mut batch)?;

    let mut encoders = EncoderTable::default();
    for field in ENCODED_FIELDS {
        let encoder = fit_encode_column(&mut batch, field)?;
        tracing::debug!(field, classes = encoder.len(), "fitted encoder");
        encoders.insert(field, encoder);
    }

    add_visibility_by_weight(&mut batch)?;
    drop_identifiers(&mut batch);
    let labels = extract_labels(&mut batch)?;

    let feature_columns = batch.columns.clone();
    let matrix = coerce_numeric(&batch)?;
    tracing::info!(
        rows = matrix.row_count(),
        features = matrix.column_count(),
        "fitted feature pipeline"
    );

    Ok(FitOutcome {
        matrix,
        labels,
        state: PipelineState {
            encoders,
            feature_columns,
        },
    })
}

/// Apply a previously fitted pipeline to a new batch.
///
/// The output matrix always has exactly the fitted column layout: columns
/// absent from this batch (an `Item_Type` value seen at fit time but not
/// here) are zero-filled, and columns this batch introduces beyond the
/// fitted layout are dropped. Categorical values unseen at fit time encode
/// as [`UNSEEN_CODE`].
pub fn apply(batch: &RecordBatch, state: &PipelineState) -> Result<FeatureMatrix, CoreError> {
    validate_schema(batch)?;
    let mut batch = batch.clone();

    expand_item_type(&mut batch)?;
    impute(&mut batch)?;
    normalize_fat_content(&mut batch)?;
    derive_item_category(&mut batch)?;

    for field in ENCODED_FIELDS {
        match state.encoders.get(field) {
            Some(encoder) => apply_encode_column(&mut batch, field, encoder)?,
            None => {
                // the column passes through unencoded; coercion will reject
                // it below if it is non-numeric
                tracing::warn!(field, "no fitted encoder for field, skipping encoding");
            }
        }
    }

    add_visibility_by_weight(&mut batch)?;
    drop_identifiers(&mut batch);
    reconcile_columns(&mut batch, &state.feature_columns);

    coerce_numeric(&batch)
}

fn validate_schema(batch: &RecordBatch) -> Result<(), CoreError> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !batch.has_column(field))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::input_schema(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

fn column_index_required(batch: &RecordBatch, field: &str) -> Result<usize, CoreError> {
    batch
        .column_index(field)
        .ok_or_else(|| CoreError::input_schema(format!("missing required field(s): {field}")))
}

/// Step 1: replace `Item_Type` with one boolean column per distinct value
/// observed in this batch, appended in sorted order.
///
/// The expansion is batch-local by design: apply-mode batches produce only
/// the columns their own values warrant, and reconciliation against the
/// fitted layout restores the rest.
fn expand_item_type(batch: &mut RecordBatch) -> Result<(), CoreError> {
    let idx = column_index_required(batch, ITEM_TYPE)?;
    let values: Vec<Option<String>> = batch
        .rows
        .iter()
        .map(|row| row.get(idx).and_then(string_cast))
        .collect();
    let distinct: BTreeSet<&String> = values.iter().flatten().collect();
    let dummy_columns: Vec<(String, Vec<Value>)> = distinct
        .into_iter()
        .map(|value| {
            let column = format!("{ITEM_TYPE}_{value}");
            let cells = values
                .iter()
                .map(|v| Value::Bool(v.as_ref() == Some(value)))
                .collect();
            (column, cells)
        })
        .collect();

    batch.drop_column(ITEM_TYPE);
    for (column, cells) in dummy_columns {
        batch.push_column(column, cells)?;
    }
    Ok(())
}

/// Step 2: fill missing values from batch-local statistics.
fn impute(batch: &mut RecordBatch) -> Result<(), CoreError> {
    impute_weight_median(batch)?;
    impute_size_mode(batch)?;
    Ok(())
}

fn impute_weight_median(batch: &mut RecordBatch) -> Result<(), CoreError> {
    let idx = column_index_required(batch, ITEM_WEIGHT)?;
    if !batch.column_values(idx).any(Value::is_null) {
        return Ok(());
    }
    let mut non_null: Vec<f64> = batch.column_values(idx).filter_map(numeric_cell).collect();
    if non_null.is_empty() {
        return Err(CoreError::imputation(format!(
            "`{ITEM_WEIGHT}` is entirely null, no basis for a median"
        )));
    }
    let median = median(&mut non_null);
    let fill = serde_json::Number::from_f64(median)
        .map(Value::Number)
        .unwrap_or(Value::Null);
    for row in &mut batch.rows {
        if let Some(cell) = row.get_mut(idx) {
            if cell.is_null() {
                *cell = fill.clone();
            }
        }
    }
    tracing::info!(median, "filled missing {ITEM_WEIGHT} with batch median");
    Ok(())
}

fn impute_size_mode(batch: &mut RecordBatch) -> Result<(), CoreError> {
    let idx = column_index_required(batch, OUTLET_SIZE)?;
    if !batch.column_values(idx).any(Value::is_null) {
        return Ok(());
    }
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in batch.column_values(idx).filter_map(string_cast) {
        *counts.entry(value).or_insert(0) += 1;
    }
    // ascending iteration plus strict comparison: ties resolve to the
    // smallest value
    let mut mode: Option<(String, usize)> = None;
    for (value, count) in counts {
        if mode.as_ref().is_none_or(|(_, best)| count > *best) {
            mode = Some((value, count));
        }
    }
    let Some((mode, _)) = mode else {
        // no basis to guess from; later numeric conversion fails on the
        // remaining nulls, which is the intended outcome
        tracing::warn!("`{OUTLET_SIZE}` has no non-null values, leaving nulls unfilled");
        return Ok(());
    };
    for row in &mut batch.rows {
        if let Some(cell) = row.get_mut(idx) {
            if cell.is_null() {
                *cell = Value::String(mode.clone());
            }
        }
    }
    tracing::info!(mode = %mode, "filled missing {OUTLET_SIZE} with batch mode");
    Ok(())
}

/// Step 3: canonicalize `Item_Fat_Content` spellings.
fn normalize_fat_content(batch: &mut RecordBatch) -> Result<(), CoreError> {
    let idx = column_index_required(batch, ITEM_FAT_CONTENT)?;
    for row in &mut batch.rows {
        if let Some(Value::String(s)) = row.get_mut(idx) {
            match s.as_str() {
                "LF" | "low fat" => *s = "Low Fat".to_string(),
                "reg" => *s = "Regular".to_string(),
                _ => {}
            }
        }
    }
    Ok(())
}

/// Step 4: derive `Item_Category` from the identifier prefix.
fn derive_item_category(batch: &mut RecordBatch) -> Result<(), CoreError> {
    let idx = column_index_required(batch, ITEM_IDENTIFIER)?;
    let values: Vec<Value> = batch
        .rows
        .iter()
        .map(|row| match row.get(idx) {
            Some(Value::String(s)) => Value::String(s.chars().take(2).collect()),
            _ => Value::Null,
        })
        .collect();
    batch.push_column(ITEM_CATEGORY, values)
}

/// Step 5 (fit): build a fresh encoder from the column's distinct values and
/// encode in place. Nulls stay null.
fn fit_encode_column(
    batch: &mut RecordBatch,
    field: &str,
) -> Result<CategoricalEncoder, CoreError> {
    let idx = column_index_required(batch, field)?;
    let encoder = CategoricalEncoder::fit(batch.column_values(idx).filter_map(string_cast));
    for row in &mut batch.rows {
        if let Some(cell) = row.get_mut(idx) {
            if let Some(value) = string_cast(cell) {
                *cell = Value::from(encoder.encode(&value));
            }
        }
    }
    Ok(encoder)
}

/// Step 5 (apply): encode with the fitted encoder; unseen values become the
/// sentinel, never an error. Nulls stay null.
fn apply_encode_column(
    batch: &mut RecordBatch,
    field: &str,
    encoder: &CategoricalEncoder,
) -> Result<(), CoreError> {
    let idx = column_index_required(batch, field)?;
    for row in &mut batch.rows {
        if let Some(cell) = row.get_mut(idx) {
            if let Some(value) = string_cast(cell) {
                let code = encoder.encode(&value);
                if code == UNSEEN_CODE {
                    tracing::warn!(
                        field,
                        value = %value,
                        "value unseen during fitting, encoding as sentinel"
                    );
                }
                *cell = Value::from(code);
            }
        }
    }
    Ok(())
}

/// Step 6: row-wise `Item_Visibility / Item_Weight`.
///
/// Division by an imputed zero weight is intentionally unguarded and yields
/// infinity; downstream consumers must handle it.
fn add_visibility_by_weight(batch: &mut RecordBatch) -> Result<(), CoreError> {
    let vis_idx = column_index_required(batch, ITEM_VISIBILITY)?;
    let weight_idx = column_index_required(batch, ITEM_WEIGHT)?;
    let values: Vec<Value> = batch
        .rows
        .iter()
        .map(|row| {
            let visibility = row.get(vis_idx).and_then(numeric_cell);
            let weight = row.get(weight_idx).and_then(numeric_cell);
            match (visibility, weight) {
                (Some(v), Some(w)) => {
                    let ratio = v / w;
                    // JSON numbers cannot carry inf/NaN; stringify those and
                    // let the coercion step parse them back into f64
                    serde_json::Number::from_f64(ratio)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::String(ratio.to_string()))
                }
                _ => Value::Null,
            }
        })
        .collect();
    batch.push_column(VISIBILITY_BY_WEIGHT, values)
}

/// Step 7: identifiers carry no signal for the regressor.
fn drop_identifiers(batch: &mut RecordBatch) {
    batch.drop_column(ITEM_IDENTIFIER);
    batch.drop_column(OUTLET_IDENTIFIER);
}

/// Split the label column off a fit-mode batch so it never enters the
/// feature layout. Fails if any label cell is non-numeric.
fn extract_labels(batch: &mut RecordBatch) -> Result<Option<Vec<f64>>, CoreError> {
    let Some(cells) = batch.take_column(LABEL) else {
        return Ok(None);
    };
    let mut labels = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        let value = numeric_cell(cell).ok_or_else(|| {
            CoreError::dataset(format!("label `{LABEL}` row {row} is not numeric: {cell}"))
        })?;
        labels.push(value);
    }
    Ok(Some(labels))
}

/// Step 8 (apply): force the batch into the fitted column layout.
///
/// Fit-time columns absent here are zero-filled; columns with no fitted
/// counterpart are dropped. Dropping loses whatever signal a genuinely new
/// one-hot column carried — accepted for availability, so it is logged.
fn reconcile_columns(batch: &mut RecordBatch, feature_columns: &[String]) {
    for column in &batch.columns {
        if !feature_columns.contains(column) {
            tracing::warn!(column = %column, "column has no fitted counterpart, dropping");
        }
    }
    let index_of: HashMap<&str, usize> = batch
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    for column in feature_columns {
        if !index_of.contains_key(column.as_str()) {
            tracing::debug!(column = %column, "fitted column absent from batch, zero-filling");
        }
    }
    let zero = Value::from(0);
    batch.rows = batch
        .rows
        .iter()
        .map(|row| {
            feature_columns
                .iter()
                .map(|column| match index_of.get(column.as_str()) {
                    Some(&i) => row[i].clone(),
                    None => zero.clone(),
                })
                .collect()
        })
        .collect();
    batch.columns = feature_columns.to_vec();
}

/// Step 9: every remaining cell must be numeric — the pipeline's final
/// consistency check.
fn coerce_numeric(batch: &RecordBatch) -> Result<FeatureMatrix, CoreError> {
    let mut rows = Vec::with_capacity(batch.rows.len());
    for (row_idx, row) in batch.rows.iter().enumerate() {
        let mut out = Vec::with_capacity(row.len());
        for (col_idx, cell) in row.iter().enumerate() {
            let value = numeric_cell(cell).ok_or_else(|| {
                let column = batch.columns.get(col_idx).map(String::as_str).unwrap_or("?");
                CoreError::coercion(format!(
                    "column `{column}` row {row_idx} is not numeric: {cell}"
                ))
            })?;
            out.push(value);
        }
        rows.push(out);
    }
    Ok(FeatureMatrix {
        columns: batch.columns.clone(),
        rows,
    })
}

fn string_cast(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn numeric_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn training_batch() -> RecordBatch {
        RecordBatch {
            columns: vec![
                ITEM_IDENTIFIER.into(),
                ITEM_WEIGHT.into(),
                ITEM_FAT_CONTENT.into(),
                ITEM_VISIBILITY.into(),
                ITEM_TYPE.into(),
                OUTLET_IDENTIFIER.into(),
                OUTLET_ESTABLISHMENT_YEAR.into(),
                OUTLET_SIZE.into(),
                OUTLET_LOCATION_TYPE.into(),
                OUTLET_TYPE.into(),
                LABEL.into(),
            ],
            rows: vec![
                vec![
                    json!("FDA15"),
                    json!(9.3),
                    json!("Low Fat"),
                    json!(0.016),
                    json!("Dairy"),
                    json!("OUT049"),
                    json!(1999),
                    json!("Medium"),
                    json!("Tier 1"),
                    json!("Supermarket Type1"),
                    json!(3735.14),
                ],
                vec![
                    json!("DRC01"),
                    Value::Null,
                    json!("reg"),
                    json!(0.019),
                    json!("Soft Drinks"),
                    json!("OUT018"),
                    json!(1987),
                    Value::Null,
                    json!("Tier 3"),
                    json!("Supermarket Type2"),
                    json!(443.42),
                ],
                vec![
                    json!("FDN15"),
                    json!(17.5),
                    json!("low fat"),
                    json!(0.017),
                    json!("Meat"),
                    json!("OUT049"),
                    json!(1999),
                    json!("Medium"),
                    json!("Tier 1"),
                    json!("Supermarket Type1"),
                    json!(2097.27),
                ],
            ],
        }
    }

    #[test]
    fn test_median_imputation_fills_null_weight() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let weights = outcome.matrix.column(ITEM_WEIGHT).unwrap();
        // median of [9.3, 17.5] is 13.4
        assert_eq!(weights, vec![9.3, 13.4, 17.5]);
    }

    #[test]
    fn test_mode_imputation_fills_null_size() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let sizes = outcome.matrix.column(OUTLET_SIZE).unwrap();
        // all three rows collapse to the single fitted class "Medium"
        assert_eq!(sizes, vec![0.0, 0.0, 0.0]);
        assert_eq!(outcome.state.encoders.get(OUTLET_SIZE).unwrap().len(), 1);
    }

    #[test]
    fn test_fat_content_synonyms_collapse() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let encoder = outcome.state.encoders.get(ITEM_FAT_CONTENT).unwrap();
        assert_eq!(encoder.classes(), ["Low Fat", "Regular"]);
        let fat = outcome.matrix.column(ITEM_FAT_CONTENT).unwrap();
        // "Low Fat" and "low fat" share a code; "reg" becomes "Regular"
        assert_eq!(fat, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_item_category_derived_from_identifier() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let encoder = outcome.state.encoders.get(ITEM_CATEGORY).unwrap();
        assert_eq!(encoder.classes(), ["DR", "FD"]);
        let category = outcome.matrix.column(ITEM_CATEGORY).unwrap();
        assert_eq!(category, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_one_hot_expansion_is_batch_local_and_sorted() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let one_hot: Vec<&String> = outcome
            .state
            .feature_columns
            .iter()
            .filter(|c| c.starts_with("Item_Type_"))
            .collect();
        assert_eq!(
            one_hot,
            ["Item_Type_Dairy", "Item_Type_Meat", "Item_Type_Soft Drinks"]
        );
        assert_eq!(
            outcome.matrix.column("Item_Type_Dairy").unwrap(),
            vec![1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_labels_split_off_feature_layout() {
        let outcome = fit_transform(&training_batch()).unwrap();
        assert_eq!(outcome.labels, Some(vec![3735.14, 443.42, 2097.27]));
        assert!(!outcome.state.feature_columns.contains(&LABEL.to_string()));
        assert!(outcome.matrix.column_index(LABEL).is_none());
        assert!(outcome.matrix.column_index(ITEM_IDENTIFIER).is_none());
    }

    #[test]
    fn test_unlabeled_fit_has_no_labels() {
        let mut batch = training_batch();
        batch.drop_column(LABEL);
        let outcome = fit_transform(&batch).unwrap();
        assert!(outcome.labels.is_none());
    }

    #[test]
    fn test_all_null_weight_is_imputation_error() {
        let mut batch = training_batch();
        let idx = batch.column_index(ITEM_WEIGHT).unwrap();
        for row in &mut batch.rows {
            row[idx] = Value::Null;
        }
        let err = fit_transform(&batch).unwrap_err();
        assert!(matches!(err, CoreError::Imputation(_)));
    }

    #[test]
    fn test_all_null_size_warns_then_fails_coercion() {
        let mut batch = training_batch();
        let idx = batch.column_index(OUTLET_SIZE).unwrap();
        for row in &mut batch.rows {
            row[idx] = Value::Null;
        }
        let err = fit_transform(&batch).unwrap_err();
        assert!(matches!(err, CoreError::Coercion(_)));
        assert!(err.to_string().contains(OUTLET_SIZE));
    }

    #[test]
    fn test_missing_required_field_is_schema_error() {
        let mut batch = training_batch();
        batch.drop_column(OUTLET_TYPE);
        let err = fit_transform(&batch).unwrap_err();
        assert!(matches!(err, CoreError::InputSchema(_)));
        assert!(err.to_string().contains(OUTLET_TYPE));
    }

    #[test]
    fn test_zero_weight_division_yields_infinity() {
        let mut batch = training_batch();
        let idx = batch.column_index(ITEM_WEIGHT).unwrap();
        for row in &mut batch.rows {
            row[idx] = json!(0.0);
        }
        let outcome = fit_transform(&batch).unwrap();
        let ratios = outcome.matrix.column(VISIBILITY_BY_WEIGHT).unwrap();
        assert!(ratios.iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn test_apply_unseen_category_is_sentinel() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let mut batch = training_batch();
        batch.drop_column(LABEL);
        let idx = batch.column_index(OUTLET_SIZE).unwrap();
        for row in &mut batch.rows {
            row[idx] = json!("Gigantic");
        }
        let matrix = apply(&batch, &outcome.state).unwrap();
        let sizes = matrix.column(OUTLET_SIZE).unwrap();
        assert_eq!(sizes, vec![-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_apply_reconciles_to_fitted_layout() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let mut batch = training_batch();
        batch.drop_column(LABEL);
        // a single-row batch with an item type the fit never saw
        batch.rows.truncate(1);
        let idx = batch.column_index(ITEM_TYPE).unwrap();
        batch.rows[0][idx] = json!("Seafood");
        let matrix = apply(&batch, &outcome.state).unwrap();
        assert_eq!(matrix.columns, outcome.state.feature_columns);
        // the unseen type's column is dropped; every fitted one-hot is zero
        assert_eq!(matrix.column("Item_Type_Dairy").unwrap(), vec![0.0]);
        assert_eq!(matrix.column("Item_Type_Meat").unwrap(), vec![0.0]);
        assert!(matrix.column_index("Item_Type_Seafood").is_none());
    }

    #[test]
    fn test_apply_matches_fit_row() {
        let outcome = fit_transform(&training_batch()).unwrap();
        let mut batch = training_batch();
        batch.drop_column(LABEL);
        batch.rows.truncate(1);
        // the single-row batch imputes and one-hot-expands from itself, but
        // row 0 is complete, so its feature vector must reproduce exactly
        let matrix = apply(&batch, &outcome.state).unwrap();
        assert_eq!(matrix.rows[0], outcome.matrix.rows[0]);
    }
}
