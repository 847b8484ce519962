//! Configuration parser for environment variables and `.env` files.
//!
//! Variables are read from the process environment unless the parser was
//! built from an explicit map. Empty values count as unset.

use crate::error::{ConfigError, Result, SakuraError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::settings::{
    default_state_dir, ApiCredentials, ApiSettings, DiskSettings, PollSettings,
    ProvisionSettings, ServerAccess, ServerSettings, DEFAULT_API_ROOT, DEFAULT_ZONE,
};

/// Access token variable.
pub const ENV_API_TOKEN: &str = "SAKURA_API_TOKEN";
/// Access token secret variable.
pub const ENV_API_SECRET: &str = "SAKURA_API_SECRET";
/// Zone variable.
pub const ENV_ZONE: &str = "SAKURA_ZONE";
/// API root override variable.
pub const ENV_API_ROOT: &str = "SAKURA_API_ROOT";
/// Server password variable.
pub const ENV_SERVER_PASSWORD: &str = "SAKURA_SERVER_PASSWORD";
/// SSH key resource id variable.
pub const ENV_SSH_KEY_ID: &str = "SAKURA_SSH_KEY_ID";
/// State directory variable.
pub const ENV_STATE_DIR: &str = "SAKURA_STATE_DIR";

/// Configuration parser for loading settings.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Explicit variables used instead of the process environment.
    vars: Option<HashMap<String, String>>,
}

impl ConfigParser {
    /// Creates a parser reading the process environment.
    #[must_use]
    pub const fn new() -> Self {
        Self { vars: None }
    }

    /// Creates a parser reading only the given variables.
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Loads `./.env` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_dotenv() -> Result<()> {
        let env_path = Path::new(".env");

        if env_path.exists() {
            Self::load_env_file(env_path)
        } else {
            debug!(".env file not found at: {}", env_path.display());
            Ok(())
        }
    }

    /// Loads an explicit env file. Variables already set are not overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load_env_file(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(SakuraError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        info!("Loading environment from: {}", path.display());
        dotenvy::from_path(path).map_err(|e| {
            SakuraError::Config(ConfigError::ParseError {
                message: format!("Failed to load env file: {e}"),
                location: path.display().to_string(),
            })
        })
    }

    /// Reads a variable; empty values are treated as unset.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Reads a required variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or empty.
    pub fn required(&self, name: &str) -> Result<String> {
        self.var(name)
            .ok_or_else(|| SakuraError::Config(ConfigError::missing(name)))
    }

    /// Reads a variable, falling back to a default.
    #[must_use]
    pub fn or_default(&self, name: &str, default: &str) -> String {
        self.var(name).unwrap_or_else(|| default.to_string())
    }

    /// Reads and parses a variable, falling back to a default when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is set but does not parse.
    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.var(name)
            .map_or(Ok(default), |raw| Self::parse_value(name, &raw))
    }

    fn parse_value<T>(name: &str, raw: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim().parse().map_err(|e: T::Err| {
            SakuraError::Config(ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            })
        })
    }

    fn secs_or(&self, name: &str, default: Duration) -> Result<Duration> {
        self.parse_or(name, default.as_secs()).map(Duration::from_secs)
    }

    /// Reads the API key pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the token or the secret is missing.
    pub fn credentials(&self) -> Result<ApiCredentials> {
        let token = self.required(ENV_API_TOKEN)?;
        let secret = self.required(ENV_API_SECRET)?;
        Ok(ApiCredentials::new(token, secret))
    }

    /// Reads the credentials, zone and API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are missing.
    pub fn api_settings(&self) -> Result<ApiSettings> {
        let credentials = self.credentials()?;
        let zone = self.or_default(ENV_ZONE, DEFAULT_ZONE);
        let api_root = self.or_default(ENV_API_ROOT, DEFAULT_API_ROOT);
        debug!("Using zone {zone} at {api_root}");
        Ok(ApiSettings::new(credentials, zone).with_api_root(api_root))
    }

    /// Reads polling intervals and ceilings.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is not a whole number of seconds.
    pub fn poll_settings(&self) -> Result<PollSettings> {
        let defaults = PollSettings::default();
        Ok(PollSettings {
            interval: self.secs_or("SAKURA_POLL_INTERVAL_SECS", defaults.interval)?,
            disk_timeout: self.secs_or("SAKURA_DISK_WAIT_TIMEOUT_SECS", defaults.disk_timeout)?,
            shutdown_timeout: self
                .secs_or("SAKURA_SHUTDOWN_TIMEOUT_SECS", defaults.shutdown_timeout)?,
            boot_wait: self.secs_or("SAKURA_BOOT_WAIT_SECS", defaults.boot_wait)?,
        })
    }

    /// Reads the login material; both values are required.
    ///
    /// # Errors
    ///
    /// Returns an error if the password or SSH key id is missing, or the key
    /// id is not numeric.
    pub fn server_access(&self) -> Result<ServerAccess> {
        let password = self.required(ENV_SERVER_PASSWORD)?;
        let raw_key = self.required(ENV_SSH_KEY_ID)?;
        let ssh_key_id = Self::parse_value(ENV_SSH_KEY_ID, &raw_key)?;
        Ok(ServerAccess {
            password,
            ssh_key_id,
        })
    }

    /// Reads the disk and server shape plus login material.
    ///
    /// # Errors
    ///
    /// Returns an error if login material is missing or a number is malformed.
    pub fn provision_settings(&self) -> Result<ProvisionSettings> {
        let access = self.server_access()?;

        let d = DiskSettings::default();
        let disk = DiskSettings {
            name: self.or_default("SAKURA_DISK_NAME", &d.name),
            size_gb: self.parse_or("SAKURA_DISK_SIZE_GB", d.size_gb)?,
            source_archive_id: self.parse_or("SAKURA_SOURCE_ARCHIVE_ID", d.source_archive_id)?,
            plan_id: self.parse_or("SAKURA_DISK_PLAN_ID", d.plan_id)?,
        };

        let s = ServerSettings::default();
        let server = ServerSettings {
            name: self.or_default("SAKURA_SERVER_NAME", &s.name),
            host_name: self.or_default("SAKURA_HOST_NAME", &s.host_name),
            cpu: self.parse_or("SAKURA_SERVER_CPU", s.cpu)?,
            gpu: self.parse_or("SAKURA_SERVER_GPU", s.gpu)?,
            gpu_model: self.or_default("SAKURA_SERVER_GPU_MODEL", &s.gpu_model),
            memory_mb: self.parse_or("SAKURA_SERVER_MEMORY_MB", s.memory_mb)?,
        };

        Ok(ProvisionSettings {
            disk,
            server,
            access,
        })
    }

    /// Directory holding the record files.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.var(ENV_STATE_DIR)
            .map_or_else(default_state_dir, PathBuf::from)
    }
}
