//! Server shutdown and cleanup.
//!
//! Powers off the recorded server, waits until it is down, deletes the
//! server and its disk and finally removes the server record.

use tracing::{debug, info, warn};

use crate::config::{ApiSettings, PollSettings};
use crate::error::Result;
use crate::state::{ServerRecord, StateStore};

use super::client::SakuraClient;
use super::poller::StatusPoller;
use super::types::INSTANCE_DOWN;

/// Result of a teardown run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// There was no server record; nothing was touched.
    NoRecord,
    /// The recorded server and disk were deleted.
    Completed(ServerRecord),
}

/// Tears down the recorded server and disk.
pub struct TeardownWorkflow<'a> {
    api: &'a ApiSettings,
    poll: PollSettings,
    store: &'a dyn StateStore,
}

impl<'a> TeardownWorkflow<'a> {
    /// Creates a workflow.
    #[must_use]
    pub fn new(api: &'a ApiSettings, poll: PollSettings, store: &'a dyn StateStore) -> Self {
        Self { api, poll, store }
    }

    /// Runs the teardown sequence.
    ///
    /// Resources are addressed in the zone stored in the record, not the
    /// configured one.
    ///
    /// # Errors
    ///
    /// Returns the first API, polling or state error. The record is only
    /// removed after both deletions succeeded.
    pub async fn run(&self) -> Result<TeardownOutcome> {
        let Some(record) = self.store.load_server().await? else {
            warn!("No server record found. Run 'server start' first.");
            return Ok(TeardownOutcome::NoRecord);
        };

        let client = SakuraClient::for_zone(self.api, &record.zone)?;
        let server_id = record.server_id;

        info!("Stopping server {server_id}...");
        let body = client.power_off(server_id).await?;
        debug!("Power-off response: {body}");

        let poller = StatusPoller::new(self.poll.interval, self.poll.shutdown_timeout);
        let resource = format!("server {server_id}");
        let client_ref = &client;
        poller
            .wait_for(&resource, INSTANCE_DOWN, || async move {
                let (server, raw) = client_ref.get_server_raw(server_id).await?;
                debug!("Server status response: {raw}");
                Ok(server.is_down().then_some(()))
            })
            .await?;

        info!("Deleting server {server_id}...");
        client.delete_server(server_id).await?;

        info!("Deleting disk {}...", record.disk_id);
        client.delete_disk(record.disk_id).await?;

        self.store.delete_server().await?;

        info!("Server shutdown and cleanup completed successfully");
        Ok(TeardownOutcome::Completed(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiCredentials;
    use crate::error::{ApiError, SakuraError};
    use crate::sakura::ResourceId;
    use crate::state::LocalStateStore;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "/cloud/zone/is1b/api/cloud/1.1";

    fn api_for(server: &MockServer) -> ApiSettings {
        // Configured zone differs on purpose: teardown follows the record.
        ApiSettings::new(ApiCredentials::new("token", "secret"), "tk1a")
            .with_api_root(format!("{}/cloud/zone", server.uri()))
    }

    fn fast_poll() -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(5),
            disk_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(5),
            boot_wait: Duration::ZERO,
        }
    }

    fn server_status(status: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "Server": {"ID": "2", "Instance": {"Status": status}}
        }))
    }

    async fn mount_deletes(server: &MockServer) {
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/server/2/power")))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"Success": true})))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/server/2")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Success": true})))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/disk/1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Success": true})))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn store_with_record(temp: &TempDir) -> LocalStateStore {
        let store = LocalStateStore::with_base_dir(temp.path());
        store
            .save_server(&ServerRecord::new(
                ResourceId(2),
                ResourceId(1),
                Some(String::from("203.0.113.5")),
                "is1b",
            ))
            .await
            .expect("save record");
        store
    }

    fn request_sequence(requests: &[wiremock::Request]) -> Vec<String> {
        requests
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path().trim_start_matches(BASE)))
            .collect()
    }

    #[tokio::test]
    async fn test_no_record_is_a_quiet_no_op() {
        let server = MockServer::start().await;
        let temp = TempDir::new().expect("temp dir");
        let store = LocalStateStore::with_base_dir(temp.path());
        let api = api_for(&server);

        let outcome = TeardownWorkflow::new(&api, fast_poll(), &store)
            .run()
            .await
            .expect("no-op should succeed");

        assert_eq!(outcome, TeardownOutcome::NoRecord);
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_teardown_order() {
        let server = MockServer::start().await;
        let temp = TempDir::new().expect("temp dir");
        mount_deletes(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/server/2")))
            .respond_with(server_status("down"))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_with_record(&temp).await;
        let api = api_for(&server);
        let outcome = TeardownWorkflow::new(&api, fast_poll(), &store)
            .run()
            .await
            .expect("teardown");

        assert!(matches!(outcome, TeardownOutcome::Completed(ref r) if r.server_id == ResourceId(2)));
        assert!(!store.server_path().exists());

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(
            request_sequence(&requests),
            vec![
                "DELETE /server/2/power",
                "GET /server/2",
                "DELETE /server/2",
                "DELETE /disk/1",
            ]
        );
    }

    #[tokio::test]
    async fn test_waits_until_down() {
        let server = MockServer::start().await;
        let temp = TempDir::new().expect("temp dir");
        mount_deletes(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/server/2")))
            .respond_with(server_status("cleaning"))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/server/2")))
            .respond_with(server_status("down"))
            .with_priority(2)
            .mount(&server)
            .await;

        let store = store_with_record(&temp).await;
        let api = api_for(&server);
        TeardownWorkflow::new(&api, fast_poll(), &store)
            .run()
            .await
            .expect("teardown");

        let requests = server.received_requests().await.unwrap_or_default();
        let polls = request_sequence(&requests)
            .iter()
            .filter(|s| *s == "GET /server/2")
            .count();
        assert_eq!(polls, 3);
    }

    #[tokio::test]
    async fn test_failed_disk_delete_keeps_record() {
        let server = MockServer::start().await;
        let temp = TempDir::new().expect("temp dir");

        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/server/2/power")))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/server/2")))
            .respond_with(server_status("down"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/server/2")))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/disk/1")))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error_code": "still_in_use"
            })))
            .mount(&server)
            .await;

        let store = store_with_record(&temp).await;
        let api = api_for(&server);
        let err = TeardownWorkflow::new(&api, fast_poll(), &store)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SakuraError::Api(ApiError::RequestFailed { status: 409, .. })
        ));
        assert!(store.server_path().exists());
    }

    #[tokio::test]
    async fn test_power_off_failure_stops_before_polling() {
        let server = MockServer::start().await;
        let temp = TempDir::new().expect("temp dir");

        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/server/2/power")))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(server_status("down"))
            .expect(0)
            .mount(&server)
            .await;

        let store = store_with_record(&temp).await;
        let api = api_for(&server);
        let err = TeardownWorkflow::new(&api, fast_poll(), &store)
            .run()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("server shutdown failed with HTTP 404"));
        assert!(store.server_path().exists());
    }
}
