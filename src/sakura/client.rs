//! Sakura Cloud API client implementation.
//!
//! This module provides the HTTP client for the zone-scoped REST API. Every
//! request is authenticated with HTTP Basic auth and every non-success
//! response goes through [`report_api_error`]. Nothing is retried.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, trace};

use crate::config::{ApiCredentials, ApiSettings};
use crate::error::{ApiError, Result, SakuraError};

use super::types::{
    CreateDiskRequest, CreateNoteRequest, CreateServerRequest, Disk, DiskConfigRequest,
    DiskEnvelope, Note, NoteEnvelope, ResourceId, Server, ServerEnvelope,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Sakura Cloud API client bound to one zone.
#[derive(Debug, Clone)]
pub struct SakuraClient {
    /// HTTP client.
    client: Client,
    /// Basic auth credentials.
    credentials: ApiCredentials,
    /// Zone-scoped base URL.
    base_url: String,
    /// Zone this client talks to.
    zone: String,
}

/// Logs a failed API call and turns it into a typed error.
///
/// The body is pretty-printed when it is JSON and passed through verbatim
/// otherwise.
#[must_use]
pub fn report_api_error(operation: &str, status: u16, body: &str) -> ApiError {
    let details = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok());

    if let Some(details) = details {
        error!("Error occurred during {operation}: status {status}, details: {details}");
        ApiError::RequestFailed {
            operation: operation.to_string(),
            status,
            details,
        }
    } else {
        error!("Error occurred during {operation}: status {status}, response: {body}");
        ApiError::RequestFailed {
            operation: operation.to_string(),
            status,
            details: body.to_string(),
        }
    }
}

impl SakuraClient {
    /// Creates a client for the configured zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api: &ApiSettings) -> Result<Self> {
        Self::for_zone(api, &api.zone)
    }

    /// Creates a client for an explicit zone, e.g. the one stored in a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn for_zone(api: &ApiSettings, zone: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::network("client setup", format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials: api.credentials.clone(),
            base_url: api.base_url(zone),
            zone: zone.to_string(),
        })
    }

    /// Zone this client talks to.
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.zone
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        trace!("{method} {url}");
        self.client
            .request(method, url)
            .basic_auth(&self.credentials.token, Some(&self.credentials.secret))
    }

    /// Sends a request and checks its status.
    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(operation, format!("Request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!("{operation}: HTTP {}", status.as_u16());
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SakuraError::Api(report_api_error(operation, status.as_u16(), &body)))
    }

    /// Sends a request and decodes the JSON response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(operation, builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(operation, format!("Failed to read response: {e}")))?;
        trace!("{operation} response: {body}");

        serde_json::from_str(&body).map_err(|e| {
            SakuraError::Api(ApiError::invalid_response(
                operation,
                format!("Failed to parse response: {e}"),
            ))
        })
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json(operation, self.request(Method::POST, path).json(body))
            .await
    }

    async fn get<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T> {
        self.send_json(operation, self.request(Method::GET, path)).await
    }

    /// Uploads a startup script.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn create_note(&self, request: &CreateNoteRequest) -> Result<Note> {
        let envelope: NoteEnvelope = self.post("script creation", "/note", request).await?;
        Ok(envelope.note)
    }

    /// Creates a disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn create_disk(&self, request: &CreateDiskRequest) -> Result<Disk> {
        let envelope: DiskEnvelope = self.post("disk creation", "/disk", request).await?;
        Ok(envelope.disk)
    }

    /// Fetches a disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn get_disk(&self, disk_id: ResourceId) -> Result<Disk> {
        let envelope: DiskEnvelope = self
            .get("disk status check", &format!("/disk/{disk_id}"))
            .await?;
        Ok(envelope.disk)
    }

    /// Writes password, host name, SSH key and startup script into a disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn configure_disk(
        &self,
        disk_id: ResourceId,
        request: &DiskConfigRequest,
    ) -> Result<()> {
        let builder = self
            .request(Method::PUT, &format!("/disk/{disk_id}/config"))
            .json(request);
        self.send("disk configuration update", builder).await?;
        Ok(())
    }

    /// Attaches a disk to a server.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn attach_disk(&self, disk_id: ResourceId, server_id: ResourceId) -> Result<()> {
        let builder = self.request(
            Method::PUT,
            &format!("/disk/{disk_id}/to/server/{server_id}"),
        );
        self.send("disk attachment", builder).await?;
        Ok(())
    }

    /// Deletes a disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn delete_disk(&self, disk_id: ResourceId) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/disk/{disk_id}"));
        self.send("disk deletion", builder).await?;
        Ok(())
    }

    /// Creates a server.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn create_server(&self, request: &CreateServerRequest) -> Result<Server> {
        let envelope: ServerEnvelope = self.post("server creation", "/server", request).await?;
        Ok(envelope.server)
    }

    /// Fetches a server.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn get_server(&self, server_id: ResourceId) -> Result<Server> {
        let envelope: ServerEnvelope = self
            .get("server status check", &format!("/server/{server_id}"))
            .await?;
        Ok(envelope.server)
    }

    /// Fetches a server and returns the raw response body alongside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn get_server_raw(&self, server_id: ResourceId) -> Result<(Server, String)> {
        let operation = "server status check";
        let response = self
            .send(operation, self.request(Method::GET, &format!("/server/{server_id}")))
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(operation, format!("Failed to read response: {e}")))?;
        let envelope: ServerEnvelope = serde_json::from_str(&body).map_err(|e| {
            ApiError::invalid_response(operation, format!("Failed to parse response: {e}"))
        })?;
        Ok((envelope.server, body))
    }

    /// Powers a server on.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn power_on(&self, server_id: ResourceId) -> Result<()> {
        let builder = self.request(Method::PUT, &format!("/server/{server_id}/power"));
        self.send("server startup", builder).await?;
        Ok(())
    }

    /// Requests a server power-off and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn power_off(&self, server_id: ResourceId) -> Result<String> {
        let builder = self.request(Method::DELETE, &format!("/server/{server_id}/power"));
        let response = self.send("server shutdown", builder).await?;
        Ok(response.text().await.unwrap_or_default())
    }

    /// Deletes a server.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    pub async fn delete_server(&self, server_id: ResourceId) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/server/{server_id}"));
        self.send("server deletion", builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> ApiSettings {
        ApiSettings::new(ApiCredentials::new("token", "secret"), "is1b")
            .with_api_root(format!("{}/cloud/zone", server.uri()))
    }

    #[test]
    fn test_report_api_error_pretty_prints_json() {
        let err = report_api_error("disk creation", 400, r#"{"error_msg":"bad plan"}"#);
        match err {
            ApiError::RequestFailed { status, details, .. } => {
                assert_eq!(status, 400);
                assert!(details.contains("\"error_msg\": \"bad plan\""));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_report_api_error_falls_back_to_raw_text() {
        let err = report_api_error("server deletion", 502, "Bad Gateway");
        assert_eq!(
            err.to_string(),
            "server deletion failed with HTTP 502: Bad Gateway"
        );
    }

    #[tokio::test]
    async fn test_requests_use_basic_auth_and_zone_path() {
        let server = MockServer::start().await;
        // base64("token:secret")
        Mock::given(method("GET"))
            .and(path("/cloud/zone/is1b/api/cloud/1.1/disk/7"))
            .and(header("authorization", "Basic dG9rZW46c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Disk": {"ID": "7", "Availability": "available"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SakuraClient::new(&api_for(&server)).expect("client");
        let disk = client.get_disk(ResourceId(7)).await.expect("disk");
        assert_eq!(disk.id, ResourceId(7));
        assert!(disk.is_available());
    }

    #[tokio::test]
    async fn test_non_success_status_is_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cloud/zone/is1b/api/cloud/1.1/server/2"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "is_fatal": true,
                "error_code": "still_running"
            })))
            .mount(&server)
            .await;

        let client = SakuraClient::new(&api_for(&server)).expect("client");
        let err = client.delete_server(ResourceId(2)).await.unwrap_err();
        match err {
            SakuraError::Api(ApiError::RequestFailed {
                operation, status, details,
            }) => {
                assert_eq!(operation, "server deletion");
                assert_eq!(status, 409);
                assert!(details.contains("still_running"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cloud/zone/is1b/api/cloud/1.1/note"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SakuraClient::new(&api_for(&server)).expect("client");
        let err = client
            .create_note(&CreateNoteRequest::shell("a.sh", "echo hi", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, SakuraError::Api(ApiError::InvalidResponse { .. })));
    }
}
