//! Artifact persistence for pipeline state.
//!
//! The pipeline itself never touches storage; fit returns a
//! [`PipelineState`] and apply takes one. Persisting and loading that state
//! goes through an [`ArtifactStore`] injected at the boundary.

use crate::error::CoreError;
use crate::persistence;
use crate::pipeline::encoder::EncoderTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Blob name of the persisted encoder table.
pub const ENCODER_TABLE: &str = "encoder_table";
/// Blob name of the persisted feature column list.
pub const FEATURE_COLUMNS: &str = "feature_columns";

/// Named-blob storage for pipeline artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Atomically overwrite the blob stored under `name`.
    fn put(&self, name: &str, blob: &[u8]) -> Result<(), CoreError>;

    /// Fetch the blob stored under `name`, `None` if absent.
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, CoreError>;
}

/// Filesystem-backed artifact store; each blob is `<dir>/<name>.json`.
pub struct FsArtifactStore {
    base_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.json"))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, name: &str, blob: &[u8]) -> Result<(), CoreError> {
        persistence::atomic_write(&self.blob_path(name), blob)
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let path = self.blob_path(name);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&path)?))
    }
}

/// Everything an apply-mode run needs to reproduce a fit-mode transform.
///
/// Created and overwritten only by a fit run; read-only afterwards. The two
/// artifacts are the sole channel of state between training and inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub encoders: EncoderTable,
    pub feature_columns: Vec<String>,
}

impl PipelineState {
    /// Persist both artifacts, overwriting any prior fit.
    pub fn save(&self, store: &dyn ArtifactStore) -> Result<(), CoreError> {
        store.put(ENCODER_TABLE, &serde_json::to_vec_pretty(&self.encoders)?)?;
        store.put(
            FEATURE_COLUMNS,
            &serde_json::to_vec_pretty(&self.feature_columns)?,
        )?;
        tracing::info!(
            encoders = self.encoders.len(),
            feature_columns = self.feature_columns.len(),
            "persisted pipeline state"
        );
        Ok(())
    }

    /// Load previously persisted state.
    ///
    /// Fails with [`CoreError::MissingState`] if either artifact is absent —
    /// apply mode invoked before any fit is a caller-visible precondition
    /// failure.
    pub fn load(store: &dyn ArtifactStore) -> Result<Self, CoreError> {
        let encoders = store.get(ENCODER_TABLE)?.ok_or_else(|| {
            CoreError::missing_state(format!(
                "artifact `{ENCODER_TABLE}` not found; fit the pipeline before applying it"
            ))
        })?;
        let feature_columns = store.get(FEATURE_COLUMNS)?.ok_or_else(|| {
            CoreError::missing_state(format!(
                "artifact `{FEATURE_COLUMNS}` not found; fit the pipeline before applying it"
            ))
        })?;
        Ok(Self {
            encoders: serde_json::from_slice(&encoders)?,
            feature_columns: serde_json::from_slice(&feature_columns)?,
        })
    }
}
