//! Read-only view of the recorded server.

use serde::Serialize;
use tracing::info;

use crate::config::ApiSettings;
use crate::error::Result;
use crate::state::{ServerRecord, StateStore};

use super::client::SakuraClient;

/// Live status of the recorded server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatusReport {
    /// The stored record.
    pub record: ServerRecord,
    /// Instance status reported by the API.
    pub instance_status: Option<String>,
    /// Current first interface address.
    pub ip_address: Option<String>,
}

/// Fetches the live status of the recorded server.
///
/// Returns `None` without any request when no server record exists.
///
/// # Errors
///
/// Returns an error if the record cannot be read or the API call fails.
pub async fn observe_server(
    api: &ApiSettings,
    store: &dyn StateStore,
) -> Result<Option<ServerStatusReport>> {
    let Some(record) = store.load_server().await? else {
        return Ok(None);
    };

    let client = SakuraClient::for_zone(api, &record.zone)?;
    info!("Fetching status of server {}", record.server_id);
    let server = client.get_server(record.server_id).await?;

    Ok(Some(ServerStatusReport {
        instance_status: server.instance_status().map(str::to_string),
        ip_address: server.first_ip_address().map(str::to_string),
        record,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiCredentials;
    use crate::sakura::ResourceId;
    use crate::state::LocalStateStore;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_reports_live_status() {
        let server = MockServer::start().await;
        let temp = TempDir::new().expect("temp dir");
        Mock::given(method("GET"))
            .and(path("/cloud/zone/is1b/api/cloud/1.1/server/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Server": {
                    "ID": "2",
                    "Instance": {"Status": "up"},
                    "Interfaces": [{"IPAddress": "203.0.113.5"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = LocalStateStore::with_base_dir(temp.path());
        store
            .save_server(&ServerRecord::new(ResourceId(2), ResourceId(1), None, "is1b"))
            .await
            .expect("save");

        let api = ApiSettings::new(ApiCredentials::new("t", "s"), "is1b")
            .with_api_root(format!("{}/cloud/zone", server.uri()));
        let report = observe_server(&api, &store)
            .await
            .expect("observe")
            .expect("record exists");

        assert_eq!(report.instance_status.as_deref(), Some("up"));
        assert_eq!(report.ip_address.as_deref(), Some("203.0.113.5"));
    }

    #[tokio::test]
    async fn test_no_record() {
        let server = MockServer::start().await;
        let temp = TempDir::new().expect("temp dir");
        let store = LocalStateStore::with_base_dir(temp.path());
        let api = ApiSettings::new(ApiCredentials::new("t", "s"), "is1b")
            .with_api_root(format!("{}/cloud/zone", server.uri()));

        assert!(observe_server(&api, &store).await.expect("observe").is_none());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
