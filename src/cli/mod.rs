//! CLI module for the Sakura Cloud GPU server tool.
//!
//! This module provides the command-line interface for provisioning and
//! tearing down GPU servers.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, ServerOperation};
pub use output::OutputFormatter;
