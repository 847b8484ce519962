//! Startup script registration.
//!
//! Uploads a local shell script as a `Note` and records its ID so the next
//! provisioning run attaches it to the disk and server.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ApiSettings;
use crate::error::{ConfigError, Result, SakuraError};
use crate::state::{ScriptRecord, StateStore};

use super::client::SakuraClient;
use super::types::CreateNoteRequest;

/// A script to upload.
#[derive(Debug, Clone)]
pub struct ScriptUpload {
    /// Local script file.
    pub path: PathBuf,
    /// Display name; defaults to the file name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: String,
}

impl ScriptUpload {
    /// Creates an upload with default name and empty description.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
            description: String::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Name the script is registered under.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| file_name(&self.path))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Registers startup scripts.
pub struct ScriptRegistrar<'a> {
    api: &'a ApiSettings,
    store: &'a dyn StateStore,
}

impl<'a> ScriptRegistrar<'a> {
    /// Creates a registrar.
    #[must_use]
    pub fn new(api: &'a ApiSettings, store: &'a dyn StateStore) -> Self {
        Self { api, store }
    }

    /// Uploads the script and persists its record.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file is missing or unreadable
    /// (before any request), or the API error if creation fails.
    pub async fn register(&self, upload: &ScriptUpload) -> Result<ScriptRecord> {
        if !upload.path.exists() {
            return Err(SakuraError::Config(ConfigError::FileNotFound {
                path: upload.path.clone(),
            }));
        }

        let content = tokio::fs::read_to_string(&upload.path).await.map_err(|e| {
            SakuraError::Config(ConfigError::ParseError {
                message: format!("Failed to read script: {e}"),
                location: upload.path.display().to_string(),
            })
        })?;

        let name = upload.display_name();
        let client = SakuraClient::new(self.api)?;

        info!("Creating script '{name}' in zone {}", client.zone());
        let request = CreateNoteRequest::shell(&name, &content, &upload.description);
        let note = client.create_note(&request).await?;
        info!("Script '{name}' created successfully. ID: {}", note.id);

        let record = ScriptRecord::new(note.id, &name, client.zone());
        self.store.save_script(&record).await?;

        Ok(record)
    }
}
