//! State management module.
//!
//! This module persists the hand-off records that connect one invocation to
//! the next: the registered startup script and the provisioned server.

mod store;
mod local;
mod types;

pub use store::StateStore;
pub use local::LocalStateStore;
pub use types::{ScriptRecord, ServerRecord, SCRIPT_RECORD_FILE, SERVER_RECORD_FILE};
