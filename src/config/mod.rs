//! Configuration module.
//!
//! This module handles all configuration-related functionality:
//! - Reading settings from the environment and `.env` files
//! - Defaults for the disk and server shape
//! - Validation of values before any resource is created

mod settings;
mod parser;
mod validator;

pub use settings::{
    ApiCredentials, ApiSettings, DiskSettings, PollSettings, ProvisionSettings, ServerAccess,
    ServerSettings, DEFAULT_API_ROOT, DEFAULT_ZONE,
};
pub use parser::{
    ConfigParser, ENV_API_ROOT, ENV_API_SECRET, ENV_API_TOKEN, ENV_SERVER_PASSWORD,
    ENV_SSH_KEY_ID, ENV_STATE_DIR, ENV_ZONE,
};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
