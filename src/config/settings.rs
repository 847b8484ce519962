//! Settings for talking to Sakura Cloud and shaping the provisioned server.
//!
//! Defaults match the GPU server this tool was built for: an H100 plan with
//! 24 vCPUs, 240 GiB of memory and a 250 GB SSD cloned from a fixed archive.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default Sakura Cloud zone.
pub const DEFAULT_ZONE: &str = "is1b";

/// Root of the zone-scoped API. The zone and API version are appended.
pub const DEFAULT_API_ROOT: &str = "https://secure.sakura.ad.jp/cloud/zone";

/// API version path appended after the zone.
pub const API_VERSION_PATH: &str = "api/cloud/1.1";

/// Default interval between status checks in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default ceiling for a disk to become available, in seconds.
pub const DEFAULT_DISK_WAIT_TIMEOUT_SECS: u64 = 1800;

/// Default ceiling for a server to power down, in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 600;

/// Default fixed wait after power-on, in seconds.
pub const DEFAULT_BOOT_WAIT_SECS: u64 = 60;

/// API key pair used for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// Access token (Basic auth user).
    pub token: String,
    /// Access token secret (Basic auth password).
    pub secret: String,
}

impl ApiCredentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("token", &self.token)
            .field("secret", &"***")
            .finish()
    }
}

/// Where and how to reach the API.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Basic auth credentials.
    pub credentials: ApiCredentials,
    /// Zone new resources are created in.
    pub zone: String,
    /// API root, without zone.
    pub api_root: String,
}

impl ApiSettings {
    /// Creates API settings for the default endpoint.
    #[must_use]
    pub fn new(credentials: ApiCredentials, zone: impl Into<String>) -> Self {
        Self {
            credentials,
            zone: zone.into(),
            api_root: DEFAULT_API_ROOT.to_string(),
        }
    }

    /// Overrides the API root (used to target a mock server).
    #[must_use]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// Returns the base URL for a zone.
    #[must_use]
    pub fn base_url(&self, zone: &str) -> String {
        format!(
            "{}/{zone}/{API_VERSION_PATH}",
            self.api_root.trim_end_matches('/')
        )
    }
}

/// Polling cadence and ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two status checks.
    pub interval: Duration,
    /// Maximum wait for a disk to become available.
    pub disk_timeout: Duration,
    /// Maximum wait for a server to power down.
    pub shutdown_timeout: Duration,
    /// Fixed wait after power-on before reading the IP address.
    pub boot_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            disk_timeout: Duration::from_secs(DEFAULT_DISK_WAIT_TIMEOUT_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            boot_wait: Duration::from_secs(DEFAULT_BOOT_WAIT_SECS),
        }
    }
}

/// Disk to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSettings {
    /// Disk name.
    pub name: String,
    /// Size in GB.
    pub size_gb: u32,
    /// Archive the disk is cloned from.
    pub source_archive_id: u64,
    /// Disk plan (4 = SSD).
    pub plan_id: u64,
}

impl Default for DiskSettings {
    fn default() -> Self {
        Self {
            name: String::from("bz-ai-server-disk"),
            size_gb: 250,
            source_archive_id: 113_600_510_456,
            plan_id: 4,
        }
    }
}

impl DiskSettings {
    /// Disk size as the API expects it.
    #[must_use]
    pub fn size_mb(&self) -> u64 {
        u64::from(self.size_gb) * 1024
    }
}

/// Server to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Server name.
    pub name: String,
    /// Host name written into the disk.
    pub host_name: String,
    /// vCPU count.
    pub cpu: u32,
    /// GPU count.
    pub gpu: u32,
    /// GPU model identifier.
    pub gpu_model: String,
    /// Memory in MB.
    pub memory_mb: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: String::from("bz-ai-server"),
            host_name: String::from("bz-ai-1"),
            cpu: 24,
            gpu: 1,
            gpu_model: String::from("nvidia_h100_80gbvram"),
            memory_mb: 245_760,
        }
    }
}

/// Login material written into the disk.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerAccess {
    /// Root password.
    pub password: String,
    /// Registered SSH public key resource.
    pub ssh_key_id: u64,
}

impl fmt::Debug for ServerAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerAccess")
            .field("password", &"***")
            .field("ssh_key_id", &self.ssh_key_id)
            .finish()
    }
}

/// Everything the provisioning workflow needs besides the API settings.
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    /// Disk to create.
    pub disk: DiskSettings,
    /// Server to create.
    pub server: ServerSettings,
    /// Login material.
    pub access: ServerAccess,
}

/// Directory holding the hand-off record files.
#[must_use]
pub fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        let api = ApiSettings::new(ApiCredentials::new("t", "s"), "tk1a");
        assert_eq!(
            api.base_url("is1b"),
            "https://secure.sakura.ad.jp/cloud/zone/is1b/api/cloud/1.1"
        );

        let api = api.with_api_root("http://127.0.0.1:9000/cloud/zone/");
        assert_eq!(
            api.base_url("tk1a"),
            "http://127.0.0.1:9000/cloud/zone/tk1a/api/cloud/1.1"
        );
    }

    #[test]
    fn test_disk_size_in_mb() {
        let disk = DiskSettings::default();
        assert_eq!(disk.size_mb(), 256_000);
    }

    #[test]
    fn test_secrets_are_redacted() {
        let creds = ApiCredentials::new("token", "very-secret");
        assert!(!format!("{creds:?}").contains("very-secret"));

        let access = ServerAccess {
            password: String::from("hunter2"),
            ssh_key_id: 7,
        };
        assert!(!format!("{access:?}").contains("hunter2"));
    }
}
