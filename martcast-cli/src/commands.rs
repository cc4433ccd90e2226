//! CLI subcommand handlers.

use martcast_core::data::{CsvSource, DataSource, summarize};
use martcast_core::pipeline::{FsArtifactStore, PipelineState, apply};
use martcast_core::serve::{self, AppState};
use martcast_core::{AppConfig, RandomForestRegressor, RecordBatch, training};
use std::path::PathBuf;
use std::sync::Arc;

/// Per-column summary of a training CSV, the first look at a new dataset.
pub async fn inspect(
    config: &AppConfig,
    train_path: Option<PathBuf>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let path = train_path.unwrap_or_else(|| config.data.train_path.clone());
    let batch = CsvSource::new(&path).load(limit).await?;
    println!("{}: {} rows x {} columns\n", path.display(), batch.row_count(), batch.column_count());

    println!(
        "{:<28} {:>8} {:>7} {:>9} {:>12} {:>12} {:>12}",
        "column", "type", "nulls", "distinct", "min", "max", "mean"
    );
    for summary in summarize(&batch) {
        println!(
            "{:<28} {:>8} {:>7} {:>9} {:>12} {:>12} {:>12}",
            summary.name,
            format!("{:?}", summary.dtype).to_lowercase(),
            summary.null_count,
            summary.distinct_count,
            fmt_stat(summary.min),
            fmt_stat(summary.max),
            fmt_stat(summary.mean),
        );
    }
    Ok(())
}

fn fmt_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}

/// Fit the pipeline and forest, persisting all artifacts.
pub async fn train(config: &AppConfig) -> anyhow::Result<()> {
    let store = FsArtifactStore::new(&config.artifacts.dir);
    let report = training::train(config, &store).await?;

    println!("Model trained and saved as {}", report.model_path.display());
    println!(
        "Rows: {} total, {} train, {} validation; {} features",
        report.rows_total, report.rows_train, report.rows_validation, report.feature_count
    );
    println!(
        "Metrics: mse={:.4} rmse={:.4} mae={:.4} r_squared={:.4}",
        report.metrics.mse, report.metrics.rmse, report.metrics.mae, report.metrics.r_squared
    );
    Ok(())
}

/// Predict sales for one JSON record given on the command line.
pub fn predict(config: &AppConfig, data: &str) -> anyhow::Result<()> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    let record = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("--data must be a JSON object"))?;

    let store = FsArtifactStore::new(&config.artifacts.dir);
    let state = PipelineState::load(&store)?;
    let model = RandomForestRegressor::load(&config.model_path())?;

    let batch = RecordBatch::from_record(record);
    let matrix = apply(&batch, &state)?;
    let prediction = model
        .predict(&matrix)?
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("prediction produced no rows"))?;

    println!("Predicted Sales: {prediction:.2}");
    Ok(())
}

/// Serve predictions over HTTP until interrupted.
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let store = FsArtifactStore::new(&config.artifacts.dir);
    let state = AppState::load(config, &store)?;
    serve::run(&config.serving, Arc::new(state)).await?;
    Ok(())
}
