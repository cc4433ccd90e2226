//! # Martcast Core
//!
//! Core library for martcast retail sales forecasting.
//! Provides the feature-transformation pipeline, artifact persistence, the
//! random-forest regressor, the training entry point, and the HTTP serving
//! router.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod persistence;
pub mod pipeline;
pub mod serve;
pub mod training;

// Re-export commonly used types at the crate root.
pub use config::AppConfig;
pub use data::{CsvSource, DataSource, JsonSource, RecordBatch};
pub use error::CoreError;
pub use model::{ForestConfig, RandomForestRegressor, RegressionMetrics};
pub use pipeline::{
    ArtifactStore, CategoricalEncoder, EncoderTable, FeatureMatrix, FitOutcome, FsArtifactStore,
    PipelineState, apply, fit_transform,
};
pub use serve::AppState;
pub use training::{TrainReport, train};
