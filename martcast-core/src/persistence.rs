//! Atomic JSON persistence for model and pipeline artifacts.
//!
//! All artifact writes go through the write-to-tmp-then-rename pattern so a
//! crash mid-write never leaves a partially written artifact behind.

use crate::error::CoreError;
use std::path::Path;

/// Serialize `value` to pretty-printed JSON and atomically write it to `path`.
///
/// Parent directories are created as needed.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

/// Atomically write raw bytes to `path` via a `.tmp` sibling and rename.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Deserialize JSON from `path`, returning `Ok(None)` when the file is absent.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artifact.json");
        atomic_write_json(&path, &vec!["a".to_string(), "b".to_string()]).unwrap();
        let loaded: Option<Vec<String>> = load_json(&path).unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_load_absent_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<Vec<String>> = load_json(&dir.path().join("missing.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_no_tmp_residue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("artifact.json");
        atomic_write_json(&path, &42u32).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
