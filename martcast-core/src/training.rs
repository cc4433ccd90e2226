//! Training entry point — dataset to persisted model in one call.
//!
//! Loads the labeled training CSV, fit-transforms it, holds out a seeded
//! validation slice, fits the forest, and persists the three artifacts every
//! serving process needs: pipeline state, model, and evaluation metrics.

use crate::config::AppConfig;
use crate::data::{CsvSource, DataSource};
use crate::error::CoreError;
use crate::model::forest::{ForestConfig, RandomForestRegressor};
use crate::model::metrics::{RegressionMetrics, evaluate};
use crate::persistence;
use crate::pipeline::{ArtifactStore, FeatureMatrix, fit_transform};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a completed training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub trained_at: DateTime<Utc>,
    pub rows_total: usize,
    pub rows_train: usize,
    pub rows_validation: usize,
    pub feature_count: usize,
    pub metrics: RegressionMetrics,
    pub model_path: PathBuf,
}

/// Train a model end to end and persist all artifacts.
///
/// Persists the pipeline state through `store` and the model and metrics
/// under the configured artifact directory, overwriting any prior run of the
/// same model version.
pub async fn train(config: &AppConfig, store: &dyn ArtifactStore) -> Result<TrainReport, CoreError> {
    if !(config.data.test_size > 0.0 && config.data.test_size < 1.0) {
        return Err(CoreError::config(format!(
            "test_size must be between 0 and 1 exclusive, got {}",
            config.data.test_size
        )));
    }

    let batch = CsvSource::new(&config.data.train_path).load(None).await?;
    if !batch.has_column(&config.data.target) {
        return Err(CoreError::dataset(format!(
            "label column `{}` not found in {}",
            config.data.target,
            config.data.train_path.display()
        )));
    }
    tracing::info!(
        rows = batch.row_count(),
        path = %config.data.train_path.display(),
        "loaded training data"
    );

    let outcome = fit_transform(&batch)?;
    let labels = outcome.labels.ok_or_else(|| {
        CoreError::dataset(format!(
            "training data produced no label vector for `{}`",
            config.data.target
        ))
    })?;

    let n = outcome.matrix.row_count();
    if n < 2 {
        return Err(CoreError::dataset(format!(
            "need at least 2 rows to split train/validation, got {n}"
        )));
    }
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.data.split_seed);
    indices.shuffle(&mut rng);
    let n_val = ((n as f64) * config.data.test_size).round() as usize;
    let n_val = n_val.clamp(1, n - 1);
    let (val_indices, train_indices) = indices.split_at(n_val);

    let train_matrix = select_rows(&outcome.matrix, train_indices);
    let train_labels = select_values(&labels, train_indices);
    let val_matrix = select_rows(&outcome.matrix, val_indices);
    let val_labels = select_values(&labels, val_indices);
    tracing::info!(
        train = train_matrix.row_count(),
        validation = val_matrix.row_count(),
        seed = config.data.split_seed,
        "split training data"
    );

    let mut model = RandomForestRegressor::new(ForestConfig::from(&config.model));
    model.fit(&train_matrix, &train_labels)?;

    let predictions = model.predict(&val_matrix)?;
    let metrics = evaluate(&predictions, &val_labels)?;
    tracing::info!(
        rmse = metrics.rmse,
        mae = metrics.mae,
        r_squared = metrics.r_squared,
        "evaluated model on validation slice"
    );

    outcome.state.save(store)?;
    let model_path = config.model_path();
    model.save(&model_path)?;
    persistence::atomic_write_json(&config.metrics_path(), &metrics)?;

    Ok(TrainReport {
        trained_at: Utc::now(),
        rows_total: n,
        rows_train: train_matrix.row_count(),
        rows_validation: val_matrix.row_count(),
        feature_count: outcome.matrix.column_count(),
        metrics,
        model_path,
    })
}

fn select_rows(matrix: &FeatureMatrix, indices: &[usize]) -> FeatureMatrix {
    FeatureMatrix {
        columns: matrix.columns.clone(),
        rows: indices.iter().map(|&i| matrix.rows[i].clone()).collect(),
    }
}

fn select_values(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FsArtifactStore;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_training_csv(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("train.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "Item_Identifier,Item_Weight,Item_Fat_Content,Item_Visibility,Item_Type,\
             Outlet_Identifier,Outlet_Establishment_Year,Outlet_Size,Outlet_Location_Type,\
             Outlet_Type,Item_Outlet_Sales"
        )
        .unwrap();
        let types = ["Dairy", "Soft Drinks", "Meat", "Snacks"];
        for i in 0..16 {
            let item_type = types[i % types.len()];
            writeln!(
                file,
                "FDA{i:02},{weight},Low Fat,{vis},{item_type},OUT0{outlet},199{year},Medium,\
                 Tier 1,Supermarket Type1,{sales}",
                weight = 8.0 + i as f64 * 0.7,
                vis = 0.01 + i as f64 * 0.002,
                outlet = i % 3,
                year = i % 10,
                sales = 500.0 + i as f64 * 210.0,
            )
            .unwrap();
        }
        path
    }

    fn small_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.data.train_path = write_training_csv(dir);
        config.model.n_trees = 8;
        config.model.max_depth = 4;
        config.artifacts.dir = dir.path().join("models");
        config
    }

    #[tokio::test]
    async fn test_train_persists_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = small_config(&dir);
        let store = FsArtifactStore::new(&config.artifacts.dir);

        let report = train(&config, &store).await.unwrap();
        assert_eq!(report.rows_total, 16);
        assert_eq!(report.rows_train + report.rows_validation, 16);
        assert_eq!(report.rows_validation, 3);
        assert!(report.metrics.rmse.is_finite());
        assert!(report.metrics.r_squared.is_finite());

        assert!(config.model_path().exists());
        assert!(config.metrics_path().exists());
        assert!(store.get("encoder_table").unwrap().is_some());
        assert!(store.get("feature_columns").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_train_is_deterministic_for_seed() {
        let dir = TempDir::new().unwrap();
        let config = small_config(&dir);
        let store = FsArtifactStore::new(&config.artifacts.dir);

        let a = train(&config, &store).await.unwrap();
        let b = train(&config, &store).await.unwrap();
        assert_eq!(a.metrics.rmse, b.metrics.rmse);
        assert_eq!(a.rows_validation, b.rows_validation);
    }

    #[tokio::test]
    async fn test_train_rejects_bad_test_size() {
        let dir = TempDir::new().unwrap();
        let mut config = small_config(&dir);
        config.data.test_size = 1.5;
        let store = FsArtifactStore::new(&config.artifacts.dir);
        let err = train(&config, &store).await.unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[tokio::test]
    async fn test_train_rejects_missing_label_column() {
        let dir = TempDir::new().unwrap();
        let mut config = small_config(&dir);
        config.data.target = "Nonexistent".into();
        let store = FsArtifactStore::new(&config.artifacts.dir);
        let err = train(&config, &store).await.unwrap_err();
        assert!(matches!(err, CoreError::Dataset(_)));
    }
}
