//! Sakura Cloud API types and data structures.
//!
//! Request bodies wrap the resource in a single PascalCase key (`Disk`,
//! `Server`, `Note`), mirroring what the API returns.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Availability reported by a disk that is ready for use.
pub const DISK_AVAILABLE: &str = "available";

/// Instance status reported by a powered-off server.
pub const INSTANCE_DOWN: &str = "down";

/// Numeric identifier of a Sakura Cloud resource.
///
/// The API encodes identifiers as JSON strings, while older tooling wrote
/// them as numbers; both forms are accepted. Serialized as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(Self(id)),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| serde::de::Error::custom(format!("invalid resource ID: {text:?}"))),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Reference to another resource by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    /// Referenced resource ID.
    #[serde(rename = "ID")]
    pub id: ResourceId,
}

impl IdRef {
    /// Creates a reference.
    #[must_use]
    pub const fn new(id: ResourceId) -> Self {
        Self { id }
    }
}

// ============================================================================
// Notes (startup scripts)
// ============================================================================

/// Body of `POST /note`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest {
    /// The note to create.
    #[serde(rename = "Note")]
    pub note: NoteSpec,
}

/// A startup script to upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoteSpec {
    /// Display name.
    pub name: String,
    /// Note class; `shell` for startup scripts.
    pub class: String,
    /// Script content.
    pub content: String,
    /// Free-form description.
    pub description: String,
}

impl CreateNoteRequest {
    /// Creates a shell startup script request.
    #[must_use]
    pub fn shell(name: &str, content: &str, description: &str) -> Self {
        Self {
            note: NoteSpec {
                name: name.to_string(),
                class: String::from("shell"),
                content: content.to_string(),
                description: description.to_string(),
            },
        }
    }
}

/// A note as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    /// Note ID.
    #[serde(rename = "ID")]
    pub id: ResourceId,
    /// Note name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

/// Envelope of a note response.
#[derive(Debug, Deserialize)]
pub(crate) struct NoteEnvelope {
    #[serde(rename = "Note")]
    pub note: Note,
}

// ============================================================================
// Disks
// ============================================================================

/// Body of `POST /disk`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDiskRequest {
    /// The disk to create.
    #[serde(rename = "Disk")]
    pub disk: DiskSpec,
}

/// A disk to create.
#[derive(Debug, Clone, Serialize)]
pub struct DiskSpec {
    /// Disk name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Size in MB.
    #[serde(rename = "SizeMB")]
    pub size_mb: u64,
    /// Archive to clone.
    #[serde(rename = "SourceArchive")]
    pub source_archive: IdRef,
    /// Disk plan.
    #[serde(rename = "Plan")]
    pub plan: IdRef,
}

/// Body of `PUT /disk/{id}/config`.
#[derive(Debug, Clone, Serialize)]
pub struct DiskConfigRequest {
    /// Root password.
    #[serde(rename = "Password")]
    pub password: String,
    /// Whether password login over SSH is disabled.
    #[serde(rename = "DisablePWAuth")]
    pub disable_pw_auth: bool,
    /// Host name.
    #[serde(rename = "HostName")]
    pub host_name: String,
    /// SSH public keys to install.
    #[serde(rename = "SSHKeys")]
    pub ssh_keys: Vec<IdRef>,
    /// Startup script to run; omitted when there is none.
    #[serde(rename = "Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<IdRef>,
}

/// A disk as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Disk {
    /// Disk ID.
    #[serde(rename = "ID")]
    pub id: ResourceId,
    /// Disk name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Availability, e.g. `migrating` or `available`.
    #[serde(rename = "Availability", default)]
    pub availability: Option<String>,
}

impl Disk {
    /// Returns true once the disk can be used.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.as_deref() == Some(DISK_AVAILABLE)
    }
}

/// Envelope of a disk response.
#[derive(Debug, Deserialize)]
pub(crate) struct DiskEnvelope {
    #[serde(rename = "Disk")]
    pub disk: Disk,
}

// ============================================================================
// Servers
// ============================================================================

/// Body of `POST /server`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateServerRequest {
    /// The server to create.
    #[serde(rename = "Server")]
    pub server: ServerSpec,
}

/// A server to create.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSpec {
    /// Server name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Compute plan.
    #[serde(rename = "ServerPlan")]
    pub plan: ServerPlanSpec,
    /// Network connections.
    #[serde(rename = "ConnectedSwitches")]
    pub connected_switches: Vec<SwitchRef>,
    /// NIC driver.
    #[serde(rename = "InterfaceDriver")]
    pub interface_driver: String,
    /// Startup scripts; omitted when there are none.
    #[serde(rename = "StartupScripts", skip_serializing_if = "Vec::is_empty")]
    pub startup_scripts: Vec<IdRef>,
}

/// Compute plan of a server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerPlanSpec {
    /// vCPU count.
    #[serde(rename = "CPU")]
    pub cpu: u32,
    /// GPU count.
    #[serde(rename = "GPU")]
    pub gpu: u32,
    /// GPU model.
    #[serde(rename = "GPUModel")]
    pub gpu_model: String,
    /// Memory in MB.
    #[serde(rename = "MemoryMB")]
    pub memory_mb: u32,
}

/// A switch connection.
#[derive(Debug, Clone, Serialize)]
pub struct SwitchRef {
    /// Switch scope; `shared` connects to the internet.
    #[serde(rename = "Scope")]
    pub scope: String,
}

impl SwitchRef {
    /// The shared internet-facing segment.
    #[must_use]
    pub fn shared() -> Self {
        Self {
            scope: String::from("shared"),
        }
    }
}

/// A server as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// Server ID.
    #[serde(rename = "ID")]
    pub id: ResourceId,
    /// Server name.
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Power state.
    #[serde(rename = "Instance", default)]
    pub instance: Option<ServerInstance>,
    /// Network interfaces.
    #[serde(rename = "Interfaces", default)]
    pub interfaces: Option<Vec<ServerInterface>>,
}

/// Power state of a server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInstance {
    /// Instance status, e.g. `up` or `down`.
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
}

/// A network interface of a server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInterface {
    /// Assigned address, if any.
    #[serde(rename = "IPAddress", default)]
    pub ip_address: Option<String>,
}

impl Server {
    /// Returns the reported instance status.
    #[must_use]
    pub fn instance_status(&self) -> Option<&str> {
        self.instance.as_ref().and_then(|i| i.status.as_deref())
    }

    /// Returns true once the server is powered off.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.instance_status() == Some(INSTANCE_DOWN)
    }

    /// Returns the first non-empty interface address.
    #[must_use]
    pub fn first_ip_address(&self) -> Option<&str> {
        self.interfaces
            .iter()
            .flatten()
            .filter_map(|iface| iface.ip_address.as_deref())
            .find(|ip| !ip.is_empty())
    }
}

/// Envelope of a server response.
#[derive(Debug, Deserialize)]
pub(crate) struct ServerEnvelope {
    #[serde(rename = "Server")]
    pub server: Server,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_id_accepts_strings_and_numbers() {
        let from_text: ResourceId = serde_json::from_value(json!("113600510456")).expect("text");
        let from_num: ResourceId = serde_json::from_value(json!(113_600_510_456_u64)).expect("num");
        assert_eq!(from_text, from_num);
        assert_eq!(serde_json::to_value(from_text).expect("ser"), json!(113_600_510_456_u64));

        assert!(serde_json::from_value::<ResourceId>(json!("abc")).is_err());
    }

    #[test]
    fn test_disk_config_omits_notes_without_script() {
        let request = DiskConfigRequest {
            password: String::from("pw"),
            disable_pw_auth: true,
            host_name: String::from("bz-ai-1"),
            ssh_keys: vec![IdRef::new(ResourceId(9))],
            notes: None,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "Password": "pw",
                "DisablePWAuth": true,
                "HostName": "bz-ai-1",
                "SSHKeys": [{"ID": 9}]
            })
        );
    }

    #[test]
    fn test_first_ip_skips_empty_interfaces() {
        let server: Server = serde_json::from_value(json!({
            "ID": "2",
            "Instance": {"Status": "up"},
            "Interfaces": [{"IPAddress": null}, {"IPAddress": ""}, {"IPAddress": "203.0.113.5"}]
        }))
        .expect("deserialize");

        assert_eq!(server.first_ip_address(), Some("203.0.113.5"));
        assert!(!server.is_down());
    }

    #[test]
    fn test_server_without_interfaces() {
        let server: Server = serde_json::from_value(json!({"ID": 2})).expect("deserialize");
        assert_eq!(server.first_ip_address(), None);
        assert_eq!(server.instance_status(), None);
    }
}
