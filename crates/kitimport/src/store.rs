//! Filesystem payload store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kitimport_types::{ImportError, ImportResult, PayloadStore};
use serde_json::Value;
use tracing::debug;

/// Reads JSON payloads from disk
///
/// Relative paths resolve against `root`; absolute paths are used as given.
#[derive(Debug, Clone, Default)]
pub struct FsPayloadStore {
    root: PathBuf,
}

impl FsPayloadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl PayloadStore for FsPayloadStore {
    async fn read_json(&self, path: &Path) -> ImportResult<Value> {
        let full_path = self.resolve(path);
        debug!("Reading payload {}", full_path.display());

        let raw = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| ImportError::PayloadRead {
                path: full_path.clone(),
                reason: e.to_string(),
            })?;

        serde_json::from_str(&raw).map_err(|e| ImportError::PayloadRead {
            path: full_path,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_reads_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"a": 1}"#).unwrap();
        let store = FsPayloadStore::new(dir.path());

        let value = store.read_json(Path::new("settings.json")).await.unwrap();

        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPayloadStore::new(dir.path());

        let err = store.read_json(Path::new("nope.json")).await.unwrap_err();

        match err {
            ImportError::PayloadRead { path, .. } => assert!(path.ends_with("nope.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{not json").unwrap();
        let store = FsPayloadStore::default();

        let err = store.read_json(&file).await.unwrap_err();

        assert!(matches!(err, ImportError::PayloadRead { .. }));
    }
}
