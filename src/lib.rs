// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Sakura GPU Server
//!
//! Provisioning and teardown of on-demand GPU servers on Sakura Cloud.
//!
//! ## Overview
//!
//! The tool drives the Sakura Cloud REST API to:
//!
//! - Register a shell startup script as a Note resource
//! - Create a disk from a source archive, configure it and wait until it is available
//! - Create a GPU server, attach the disk and power it on
//! - Power off, wait until down and delete the server and its disk
//!
//! Identifiers of created resources are kept in two small JSON records
//! (`script_info.json` and `server_info.json`) so later runs can find them.
//!
//! ## Modules
//!
//! - [`config`]: Environment-driven settings and validation
//! - [`state`]: Record storage for created resources
//! - [`sakura`]: Sakura Cloud API client and workflows
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```bash
//! export SAKURA_API_TOKEN=...
//! export SAKURA_API_SECRET=...
//! export SAKURA_SERVER_PASSWORD=...
//! export SAKURA_SSH_KEY_ID=...
//!
//! sakura-gpu create-script setup.sh
//! sakura-gpu server start
//! sakura-gpu server stop
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod sakura;
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, ProvisionSettings};
pub use error::{Result, SakuraError};
pub use sakura::{
    observe_server, ProvisionWorkflow, SakuraClient, ScriptRegistrar, StatusPoller,
    TeardownWorkflow,
};
pub use state::{LocalStateStore, ScriptRecord, ServerRecord, StateStore};
