//! State store trait definition.
//!
//! This module defines the common interface for record storage backends.

use async_trait::async_trait;

use super::types::{ScriptRecord, ServerRecord};
use crate::error::Result;

/// Trait for record storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the script record.
    ///
    /// Returns `None` if no script has been registered.
    async fn load_script(&self) -> Result<Option<ScriptRecord>>;

    /// Saves the script record, replacing any previous one.
    async fn save_script(&self, record: &ScriptRecord) -> Result<()>;

    /// Loads the server record.
    ///
    /// Returns `None` if no server has been provisioned.
    async fn load_server(&self) -> Result<Option<ServerRecord>>;

    /// Saves the server record, replacing any previous one.
    async fn save_server(&self, record: &ServerRecord) -> Result<()>;

    /// Deletes the server record.
    async fn delete_server(&self) -> Result<()>;
}
