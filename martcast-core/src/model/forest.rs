//! Bagged random-forest regressor.

use crate::config::ModelConfig;
use crate::error::CoreError;
use crate::model::tree::{RegressionTree, TreeConfig};
use crate::persistence;
use crate::pipeline::FeatureMatrix;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Forest hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Candidate features per split; defaults to `n_features / 3`.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl From<&ModelConfig> for ForestConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            n_trees: config.n_trees,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: None,
            bootstrap: true,
            seed: config.seed,
        }
    }
}

/// An ensemble of bootstrap-sampled regression trees. Predictions are the
/// mean of the per-tree predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    feature_names: Vec<String>,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
        }
    }

    /// Fit the forest on a feature matrix and label vector.
    pub fn fit(&mut self, matrix: &FeatureMatrix, labels: &[f64]) -> Result<(), CoreError> {
        if matrix.rows.is_empty() {
            return Err(CoreError::model("cannot fit on an empty matrix"));
        }
        if matrix.rows.len() != labels.len() {
            return Err(CoreError::model(format!(
                "matrix has {} rows but {} labels",
                matrix.rows.len(),
                labels.len()
            )));
        }

        self.feature_names = matrix.columns.clone();
        let n_features = matrix.column_count();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features / 3).max(1));

        self.trees = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let seed = self.config.seed.wrapping_add(i as u64);
                let tree_config = TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed,
                };
                let mut tree = RegressionTree::new(tree_config);
                if self.config.bootstrap {
                    let (rows, sampled) = bootstrap_sample(&matrix.rows, labels, seed);
                    tree.fit(&rows, &sampled);
                } else {
                    tree.fit(&matrix.rows, labels);
                }
                tree
            })
            .collect();

        tracing::info!(
            trees = self.trees.len(),
            features = n_features,
            rows = matrix.row_count(),
            "fitted random forest"
        );
        Ok(())
    }

    /// Predict one value per matrix row, in row order.
    pub fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, CoreError> {
        if self.trees.is_empty() {
            return Err(CoreError::model("forest has not been fitted"));
        }
        if matrix.columns != self.feature_names {
            return Err(CoreError::model(format!(
                "feature layout mismatch: expected {} columns, got {}",
                self.feature_names.len(),
                matrix.column_count()
            )));
        }
        Ok(matrix
            .rows
            .par_iter()
            .map(|row| self.predict_row(row))
            .collect())
    }

    fn predict_row(&self, features: &[f64]) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_one(features))
            .sum();
        sum / self.trees.len() as f64
    }

    /// Persist the fitted forest as JSON.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        persistence::atomic_write_json(path, self)?;
        tracing::info!(path = %path.display(), "saved model");
        Ok(())
    }

    /// Load a previously saved forest.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        persistence::load_json(path)?.ok_or_else(|| {
            CoreError::model(format!("model file not found at {}", path.display()))
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

fn bootstrap_sample(rows: &[Vec<f64>], labels: &[f64], seed: u64) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = rows.len();
    let mut sampled_rows = Vec::with_capacity(n);
    let mut sampled_labels = Vec::with_capacity(n);
    for _ in 0..n {
        let i = rng.gen_range(0..n);
        sampled_rows.push(rows[i].clone());
        sampled_labels.push(labels[i]);
    }
    (sampled_rows, sampled_labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn linear_matrix(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64 / 10.0, ((i * 3) % 7) as f64])
            .collect();
        let labels: Vec<f64> = rows.iter().map(|r| 2.0 * r[0] + r[1]).collect();
        let matrix = FeatureMatrix {
            columns: vec!["x1".into(), "x2".into()],
            rows,
        };
        (matrix, labels)
    }

    #[test]
    fn test_fit_and_predict() {
        let (matrix, labels) = linear_matrix(200);
        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 10,
            max_depth: 6,
            ..Default::default()
        });
        forest.fit(&matrix, &labels).unwrap();
        assert_eq!(forest.n_trees(), 10);

        let predictions = forest.predict(&matrix).unwrap();
        assert_eq!(predictions.len(), 200);
        assert!(predictions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let (matrix, labels) = linear_matrix(80);
        let config = ForestConfig {
            n_trees: 5,
            seed: 7,
            ..Default::default()
        };
        let mut a = RandomForestRegressor::new(config.clone());
        let mut b = RandomForestRegressor::new(config);
        a.fit(&matrix, &labels).unwrap();
        b.fit(&matrix, &labels).unwrap();
        assert_eq!(a.predict(&matrix).unwrap(), b.predict(&matrix).unwrap());
    }

    #[test]
    fn test_predict_unfitted_is_model_error() {
        let (matrix, _) = linear_matrix(10);
        let forest = RandomForestRegressor::new(ForestConfig::default());
        let err = forest.predict(&matrix).unwrap_err();
        assert!(matches!(err, CoreError::Model(_)));
    }

    #[test]
    fn test_label_length_mismatch() {
        let (matrix, _) = linear_matrix(10);
        let mut forest = RandomForestRegressor::new(ForestConfig::default());
        let err = forest.fit(&matrix, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoreError::Model(_)));
    }

    #[test]
    fn test_feature_layout_mismatch() {
        let (matrix, labels) = linear_matrix(50);
        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 3,
            ..Default::default()
        });
        forest.fit(&matrix, &labels).unwrap();

        let mut reordered = matrix.clone();
        reordered.columns.swap(0, 1);
        let err = forest.predict(&reordered).unwrap_err();
        assert!(matches!(err, CoreError::Model(_)));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model_v1.json");
        let (matrix, labels) = linear_matrix(60);
        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_trees: 4,
            ..Default::default()
        });
        forest.fit(&matrix, &labels).unwrap();
        forest.save(&path).unwrap();

        let loaded = RandomForestRegressor::load(&path).unwrap();
        assert_eq!(loaded.n_trees(), 4);
        assert_eq!(
            loaded.predict(&matrix).unwrap(),
            forest.predict(&matrix).unwrap()
        );
    }

    #[test]
    fn test_load_missing_model() {
        let dir = TempDir::new().unwrap();
        let err = RandomForestRegressor::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CoreError::Model(_)));
    }
}
