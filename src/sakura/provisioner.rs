//! GPU server provisioning.
//!
//! Creates a disk from an archive, writes login material into it, creates a
//! GPU server, attaches the disk, powers the server on and records the
//! resulting IDs. Every step waits for the previous one; the first failure
//! stops the run.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::{ApiSettings, DiskSettings, PollSettings, ProvisionSettings, ServerSettings};
use crate::error::Result;
use crate::state::{ScriptRecord, ServerRecord, StateStore};

use super::client::SakuraClient;
use super::poller::StatusPoller;
use super::types::{
    CreateDiskRequest, CreateServerRequest, DiskConfigRequest, DiskSpec, IdRef, ResourceId,
    ServerPlanSpec, ServerSpec, SwitchRef, DISK_AVAILABLE,
};

/// NIC driver for new servers.
const INTERFACE_DRIVER: &str = "virtio";

/// Result of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    /// The persisted record.
    pub record: ServerRecord,
    /// Startup script attached to the server, if any.
    pub script_id: Option<ResourceId>,
    /// When the server record was written.
    pub completed_at: DateTime<Utc>,
}

/// Provisions a GPU server with its disk.
pub struct ProvisionWorkflow<'a> {
    api: &'a ApiSettings,
    settings: &'a ProvisionSettings,
    poll: PollSettings,
    store: &'a dyn StateStore,
}

impl<'a> ProvisionWorkflow<'a> {
    /// Creates a workflow.
    #[must_use]
    pub fn new(
        api: &'a ApiSettings,
        settings: &'a ProvisionSettings,
        poll: PollSettings,
        store: &'a dyn StateStore,
    ) -> Self {
        Self {
            api,
            settings,
            poll,
            store,
        }
    }

    /// Runs the full provisioning sequence.
    ///
    /// # Errors
    ///
    /// Returns the first API, polling or state error. Resources created
    /// before the failure are left in place.
    pub async fn run(&self) -> Result<ProvisionOutcome> {
        let script_id = self.load_script_id().await?;
        let client = SakuraClient::new(self.api)?;

        info!("Creating disk...");
        let disk = client
            .create_disk(&build_disk_request(&self.settings.disk))
            .await?;
        let disk_id = disk.id;
        info!("Disk created. ID: {disk_id}");

        match self.provision_with_disk(&client, disk_id, script_id).await {
            Ok(record) => Ok(ProvisionOutcome {
                record,
                script_id,
                completed_at: Utc::now(),
            }),
            Err(e) => {
                error!(
                    "Provisioning stopped after disk {disk_id} was created in zone {}; it was not removed",
                    client.zone()
                );
                Err(e)
            }
        }
    }

    async fn load_script_id(&self) -> Result<Option<ResourceId>> {
        match self.store.load_script().await? {
            Some(ScriptRecord {
                script_id, zone, ..
            }) => {
                info!("Loaded script ID: {script_id}");
                if zone != self.api.zone {
                    warn!(
                        "Script {script_id} was registered in zone {zone}, provisioning in {}",
                        self.api.zone
                    );
                }
                Ok(Some(script_id))
            }
            None => {
                warn!("No script record found. Creating server without startup script.");
                Ok(None)
            }
        }
    }

    async fn provision_with_disk(
        &self,
        client: &SakuraClient,
        disk_id: ResourceId,
        script_id: Option<ResourceId>,
    ) -> Result<ServerRecord> {
        info!("Waiting for disk to be ready...");
        self.wait_for_disk(client, disk_id).await?;

        info!("Updating disk configuration...");
        client
            .configure_disk(disk_id, &build_disk_config(self.settings, script_id))
            .await?;

        info!("Waiting for disk to be ready after configuration update...");
        self.wait_for_disk(client, disk_id).await?;

        info!("Creating server...");
        let server = client
            .create_server(&build_server_request(&self.settings.server, script_id))
            .await?;
        let server_id = server.id;
        info!("Server created. ID: {server_id}");

        info!("Attaching disk to server...");
        client.attach_disk(disk_id, server_id).await?;

        info!("Starting server...");
        client.power_on(server_id).await?;

        // Fixed delay; nothing is probed on the server itself.
        info!(
            "Waiting {}s for the server to boot...",
            self.poll.boot_wait.as_secs()
        );
        tokio::time::sleep(self.poll.boot_wait).await;

        info!("Getting server details...");
        let details = client.get_server(server_id).await?;
        let ip_address = details.first_ip_address().map(str::to_string);
        match &ip_address {
            Some(ip) => info!("Server IP address: {ip}"),
            None => warn!("Could not retrieve server IP address"),
        }

        let record = ServerRecord::new(server_id, disk_id, ip_address, client.zone());
        self.store.save_server(&record).await?;

        info!("Server creation and startup completed successfully");
        Ok(record)
    }

    async fn wait_for_disk(&self, client: &SakuraClient, disk_id: ResourceId) -> Result<()> {
        let poller = StatusPoller::new(self.poll.interval, self.poll.disk_timeout);
        let resource = format!("disk {disk_id}");

        poller
            .wait_for(&resource, DISK_AVAILABLE, || async move {
                let disk = client.get_disk(disk_id).await?;
                Ok(disk.is_available().then_some(()))
            })
            .await
    }
}

/// Builds the disk creation body.
#[must_use]
pub fn build_disk_request(disk: &DiskSettings) -> CreateDiskRequest {
    CreateDiskRequest {
        disk: DiskSpec {
            name: disk.name.clone(),
            size_mb: disk.size_mb(),
            source_archive: IdRef::new(ResourceId(disk.source_archive_id)),
            plan: IdRef::new(ResourceId(disk.plan_id)),
        },
    }
}

/// Builds the disk configuration body.
#[must_use]
pub fn build_disk_config(
    settings: &ProvisionSettings,
    script_id: Option<ResourceId>,
) -> DiskConfigRequest {
    DiskConfigRequest {
        password: settings.access.password.clone(),
        disable_pw_auth: true,
        host_name: settings.server.host_name.clone(),
        ssh_keys: vec![IdRef::new(ResourceId(settings.access.ssh_key_id))],
        notes: script_id.map(IdRef::new),
    }
}

/// Builds the server creation body.
#[must_use]
pub fn build_server_request(
    server: &ServerSettings,
    script_id: Option<ResourceId>,
) -> CreateServerRequest {
    CreateServerRequest {
        server: ServerSpec {
            name: server.name.clone(),
            plan: ServerPlanSpec {
                cpu: server.cpu,
                gpu: server.gpu,
                gpu_model: server.gpu_model.clone(),
                memory_mb: server.memory_mb,
            },
            connected_switches: vec![SwitchRef::shared()],
            interface_driver: INTERFACE_DRIVER.to_string(),
            startup_scripts: script_id.map(IdRef::new).into_iter().collect(),
        },
    }
}
