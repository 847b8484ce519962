//! Hand-off records passed between invocations.
//!
//! Field names are kept stable so record files stay readable by other tools
//! that share the same working directory.

use serde::{Deserialize, Serialize};

use crate::sakura::ResourceId;

/// File name of the script record.
pub const SCRIPT_RECORD_FILE: &str = "script_info.json";

/// File name of the server record.
pub const SERVER_RECORD_FILE: &str = "server_info.json";

/// A registered startup script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    /// Note ID of the script.
    pub script_id: ResourceId,
    /// Display name of the script.
    pub script_name: String,
    /// Zone the script was registered in.
    pub zone: String,
}

/// A provisioned server and its disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Server ID.
    pub server_id: ResourceId,
    /// Disk ID.
    pub disk_id: ResourceId,
    /// First public address, if one was assigned in time.
    pub ip_address: Option<String>,
    /// Zone the resources live in.
    pub zone: String,
}

impl ScriptRecord {
    /// Creates a script record.
    #[must_use]
    pub fn new(script_id: ResourceId, script_name: &str, zone: &str) -> Self {
        Self {
            script_id,
            script_name: script_name.to_string(),
            zone: zone.to_string(),
        }
    }
}

impl ServerRecord {
    /// Creates a server record.
    #[must_use]
    pub fn new(
        server_id: ResourceId,
        disk_id: ResourceId,
        ip_address: Option<String>,
        zone: &str,
    ) -> Self {
        Self {
            server_id,
            disk_id,
            ip_address,
            zone: zone.to_string(),
        }
    }

    /// Suggested SSH command, when the address is known.
    #[must_use]
    pub fn ssh_command(&self) -> Option<String> {
        self.ip_address.as_ref().map(|ip| format!("ssh root@{ip}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_record_reads_plain_files() {
        let record: ServerRecord = serde_json::from_value(json!({
            "server_id": 2,
            "disk_id": "1",
            "ip_address": null,
            "zone": "is1b"
        }))
        .expect("deserialize");

        assert_eq!(record.server_id, ResourceId(2));
        assert_eq!(record.disk_id, ResourceId(1));
        assert_eq!(record.ip_address, None);
        assert_eq!(record.ssh_command(), None);
    }

    #[test]
    fn test_server_record_shape() {
        let record = ServerRecord::new(
            ResourceId(2),
            ResourceId(1),
            Some(String::from("203.0.113.5")),
            "is1b",
        );
        assert_eq!(
            serde_json::to_value(&record).expect("serialize"),
            json!({
                "server_id": 2,
                "disk_id": 1,
                "ip_address": "203.0.113.5",
                "zone": "is1b"
            })
        );
    }

    #[test]
    fn test_script_record_shape() {
        let record = ScriptRecord::new(ResourceId(99), "setup.sh", "tk1a");
        assert_eq!(
            serde_json::to_value(&record).expect("serialize"),
            json!({"script_id": 99, "script_name": "setup.sh", "zone": "tk1a"})
        );
    }
}
