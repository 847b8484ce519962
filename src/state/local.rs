//! Local file-based state storage backend.
//!
//! Records are plain JSON files in one directory (the working directory by
//! default). Writes go through a temporary file and a rename.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Result, SakuraError, StateError};

use super::store::StateStore;
use super::types::{ScriptRecord, ServerRecord, SCRIPT_RECORD_FILE, SERVER_RECORD_FILE};

/// Local file-based state store.
#[derive(Debug)]
pub struct LocalStateStore {
    /// Directory holding the record files.
    base_dir: PathBuf,
    /// Path to the script record.
    script_path: PathBuf,
    /// Path to the server record.
    server_path: PathBuf,
}

impl LocalStateStore {
    /// Creates a store in the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_dir(".")
    }

    /// Creates a store in a custom directory.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let script_path = base_dir.join(SCRIPT_RECORD_FILE);
        let server_path = base_dir.join(SERVER_RECORD_FILE);

        Self {
            base_dir,
            script_path,
            server_path,
        }
    }

    /// Path of the script record.
    #[must_use]
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Path of the server record.
    #[must_use]
    pub fn server_path(&self) -> &Path {
        &self.server_path
    }

    /// Ensures the state directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            debug!("Creating state directory: {}", self.base_dir.display());
            fs::create_dir_all(&self.base_dir).await.map_err(|e| {
                SakuraError::State(StateError::WriteFailed {
                    path: self.base_dir.clone(),
                    message: format!("Failed to create state directory: {e}"),
                })
            })?;
        }
        Ok(())
    }

    async fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            debug!("Record file does not exist: {}", path.display());
            return Ok(None);
        }

        info!("Loading record from: {}", path.display());

        let content = fs::read_to_string(path).await.map_err(|e| {
            SakuraError::State(StateError::Corrupted {
                path: path.to_path_buf(),
                message: format!("Failed to read record file: {e}"),
            })
        })?;

        let record = serde_json::from_str(&content).map_err(|e| {
            SakuraError::State(StateError::Corrupted {
                path: path.to_path_buf(),
                message: format!("Failed to parse record file: {e}"),
            })
        })?;

        Ok(Some(record))
    }

    async fn write_record<T: Serialize + Sync>(&self, path: &Path, record: &T) -> Result<()> {
        self.ensure_dir().await?;

        info!("Saving record to: {}", path.display());

        let content = serde_json::to_string_pretty(record).map_err(|e| {
            SakuraError::State(StateError::SerializationError {
                message: format!("Failed to serialize record: {e}"),
            })
        })?;

        let write_failed = |message: String| {
            SakuraError::State(StateError::WriteFailed {
                path: path.to_path_buf(),
                message,
            })
        };

        // Write to a temporary file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| write_failed(format!("Failed to create temp file: {e}")))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| write_failed(format!("Failed to write record: {e}")))?;

        file.sync_all()
            .await
            .map_err(|e| write_failed(format!("Failed to sync record: {e}")))?;

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| write_failed(format!("Failed to rename record file: {e}")))?;

        debug!("Record saved successfully");
        Ok(())
    }
}

impl Default for LocalStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn load_script(&self) -> Result<Option<ScriptRecord>> {
        Self::read_record(&self.script_path).await
    }

    async fn save_script(&self, record: &ScriptRecord) -> Result<()> {
        self.write_record(&self.script_path, record).await
    }

    async fn load_server(&self) -> Result<Option<ServerRecord>> {
        Self::read_record(&self.server_path).await
    }

    async fn save_server(&self, record: &ServerRecord) -> Result<()> {
        self.write_record(&self.server_path, record).await
    }

    async fn delete_server(&self) -> Result<()> {
        if self.server_path.exists() {
            info!("Deleting record file: {}", self.server_path.display());
            fs::remove_file(&self.server_path).await.map_err(|e| {
                SakuraError::State(StateError::WriteFailed {
                    path: self.server_path.clone(),
                    message: format!("Failed to delete record file: {e}"),
                })
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sakura::ResourceId;
    use tempfile::TempDir;

    fn create_test_store() -> (LocalStateStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalStateStore::with_base_dir(temp_dir.path());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_save_and_load_server() {
        let (store, _temp) = create_test_store();

        let record = ServerRecord::new(
            ResourceId(2),
            ResourceId(1),
            Some(String::from("203.0.113.5")),
            "is1b",
        );
        store.save_server(&record).await.expect("Failed to save record");

        let loaded = store
            .load_server()
            .await
            .expect("Failed to load record")
            .expect("Record should exist");

        assert_eq!(loaded, record);
        assert!(!store.server_path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _temp) = create_test_store();

        assert!(store.load_server().await.expect("load").is_none());
        assert!(store.load_script().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_script() {
        let (store, _temp) = create_test_store();

        store
            .save_script(&ScriptRecord::new(ResourceId(1), "old.sh", "is1b"))
            .await
            .expect("save");
        store
            .save_script(&ScriptRecord::new(ResourceId(2), "new.sh", "tk1a"))
            .await
            .expect("save");

        let loaded = store.load_script().await.expect("load").expect("exists");
        assert_eq!(loaded.script_id, ResourceId(2));
        assert_eq!(loaded.zone, "tk1a");
    }

    #[tokio::test]
    async fn test_delete_server() {
        let (store, _temp) = create_test_store();

        store
            .save_server(&ServerRecord::new(ResourceId(2), ResourceId(1), None, "is1b"))
            .await
            .expect("save");
        store.delete_server().await.expect("delete");
        assert!(!store.server_path().exists());

        // Deleting twice is fine
        store.delete_server().await.expect("delete again");
    }

    #[tokio::test]
    async fn test_corrupted_record() {
        let (store, _temp) = create_test_store();

        std::fs::write(store.script_path(), "{ not json").expect("write");
        let err = store.load_script().await.unwrap_err();
        assert!(matches!(err, SakuraError::State(StateError::Corrupted { .. })));
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = LocalStateStore::with_base_dir(temp_dir.path().join("nested"));

        store
            .save_script(&ScriptRecord::new(ResourceId(5), "a.sh", "is1b"))
            .await
            .expect("save");
        assert!(store.script_path().exists());
    }
}
