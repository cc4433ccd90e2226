//! Configuration types for the martcast workspace.
//!
//! Loaded from a YAML file (`config.yaml` by convention); every section and
//! field has a default so a partial file is enough.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Training data configuration.
    #[serde(default)]
    pub data: DataConfig,
    /// Regressor hyperparameters.
    #[serde(default)]
    pub model: ModelConfig,
    /// Artifact storage configuration.
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    /// HTTP serving configuration.
    #[serde(default)]
    pub serving: ServingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| CoreError::config(format!("{}: {e}", path.display())))
    }

    /// Load configuration from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Path of the serialized model for the configured version.
    pub fn model_path(&self) -> PathBuf {
        self.artifacts.dir.join(format!("model_{}.json", self.model.version))
    }

    /// Path of the evaluation metrics saved next to the model.
    pub fn metrics_path(&self) -> PathBuf {
        self.artifacts
            .dir
            .join(format!("model_{}_metrics.json", self.model.version))
    }
}

/// Training data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the labeled training CSV.
    #[serde(default = "default_train_path")]
    pub train_path: PathBuf,
    /// Name of the label column.
    #[serde(default = "default_target")]
    pub target: String,
    /// Fraction of rows held out for validation (0.0-1.0 exclusive).
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed for the train/validation shuffle.
    #[serde(default = "default_seed")]
    pub split_seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_path: default_train_path(),
            target: default_target(),
            test_size: default_test_size(),
            split_seed: default_seed(),
        }
    }
}

fn default_train_path() -> PathBuf {
    PathBuf::from("data/train.csv")
}

fn default_target() -> String {
    "Item_Outlet_Sales".to_string()
}

fn default_test_size() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Random-forest hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of trees in the forest.
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    /// Maximum depth of each tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum samples required to split a node.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Minimum samples in a leaf.
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Seed for bootstrap sampling and feature subsampling.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Model version tag used in artifact file names.
    #[serde(default = "default_model_version")]
    pub version: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            seed: default_seed(),
            version: default_model_version(),
        }
    }
}

fn default_n_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    10
}

fn default_min_samples_split() -> usize {
    5
}

fn default_min_samples_leaf() -> usize {
    2
}

fn default_model_version() -> String {
    "v1".to_string()
}

/// Artifact storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding pipeline state, model, and metrics artifacts.
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
        }
    }
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("models")
}

/// HTTP serving configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}
