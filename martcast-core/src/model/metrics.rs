//! Regression evaluation metrics.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Validation metrics for a fitted regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
}

/// Compute metrics over predictions and their targets (same order).
pub fn evaluate(predictions: &[f64], targets: &[f64]) -> Result<RegressionMetrics, CoreError> {
    if predictions.is_empty() {
        return Err(CoreError::model("cannot evaluate on zero predictions"));
    }
    if predictions.len() != targets.len() {
        return Err(CoreError::model(format!(
            "{} predictions but {} targets",
            predictions.len(),
            targets.len()
        )));
    }

    let n = predictions.len() as f64;
    let mse = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).powi(2))
        .sum::<f64>()
        / n;
    let mae = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / n;

    let target_mean = targets.iter().sum::<f64>() / n;
    let ss_res: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = targets.iter().map(|t| (t - target_mean).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(RegressionMetrics {
        mse,
        rmse: mse.sqrt(),
        mae,
        r_squared,
    })
}
