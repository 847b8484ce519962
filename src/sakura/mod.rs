//! Sakura Cloud API integration module.
//!
//! This module provides the REST client, the request/response types, and the
//! workflows built on top of them: script registration, provisioning,
//! teardown and status observation.

mod client;
mod types;
mod poller;
mod registrar;
mod provisioner;
mod teardown;
mod observer;

pub use client::{report_api_error, SakuraClient};
pub use types::{
    CreateDiskRequest, CreateNoteRequest, CreateServerRequest, Disk, DiskConfigRequest, DiskSpec,
    IdRef, Note, NoteSpec, ResourceId, Server, ServerInstance, ServerInterface, ServerPlanSpec,
    ServerSpec, SwitchRef, DISK_AVAILABLE, INSTANCE_DOWN,
};
pub use poller::StatusPoller;
pub use registrar::{ScriptRegistrar, ScriptUpload};
pub use provisioner::{
    build_disk_config, build_disk_request, build_server_request, ProvisionOutcome,
    ProvisionWorkflow,
};
pub use teardown::{TeardownOutcome, TeardownWorkflow};
pub use observer::{observe_server, ServerStatusReport};
