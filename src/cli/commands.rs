//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sakura Cloud GPU server management.
#[derive(Parser, Debug)]
#[command(name = "sakura-gpu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Directory holding `script_info.json` and `server_info.json`.
    #[arg(long, global = true, env = "SAKURA_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Env file to load instead of `./.env`.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Server management.
    Server {
        /// Operation to perform on the server.
        #[arg(value_enum)]
        operation: ServerOperation,
    },

    /// Create a startup script resource.
    CreateScript {
        /// Path to the script file.
        script_path: PathBuf,

        /// Name of the script resource (defaults to the file name).
        #[arg(long)]
        name: Option<String>,

        /// Description of the script.
        #[arg(long, default_value = "")]
        description: String,
    },
}

/// Server lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServerOperation {
    /// Create the disk and server and power it on.
    Start,
    /// Power off and delete the server and disk.
    Stop,
    /// Show the live status of the recorded server.
    Status,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
