//! Sakura GPU CLI entrypoint.
//!
//! This is the main entrypoint for the sakura-gpu command-line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use sakura_gpu_server::cli::{Cli, Commands, OutputFormatter, ServerOperation};
use sakura_gpu_server::config::{ConfigParser, ConfigValidator};
use sakura_gpu_server::error::Result;
use sakura_gpu_server::sakura::{
    observe_server, ProvisionWorkflow, ScriptRegistrar, ScriptUpload, TeardownOutcome,
    TeardownWorkflow,
};
use sakura_gpu_server::state::{LocalStateStore, StateStore};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    let parser = ConfigParser::new();
    match &cli.env_file {
        Some(path) => ConfigParser::load_env_file(path)?,
        None => ConfigParser::load_dotenv()?,
    }

    let store = LocalStateStore::with_base_dir(resolve_state_dir(cli.state_dir, &parser));
    debug!("Records stored in: {}", store.script_path().display());

    match cli.command {
        Commands::Server { operation } => match operation {
            ServerOperation::Start => cmd_start(&parser, &store, &formatter).await,
            ServerOperation::Stop => cmd_stop(&parser, &store, &formatter).await,
            ServerOperation::Status => cmd_status(&parser, &store, &formatter).await,
        },
        Commands::CreateScript {
            script_path,
            name,
            description,
        } => {
            let upload = ScriptUpload::new(script_path)
                .with_name(name)
                .with_description(description);
            cmd_create_script(&parser, &store, &upload, &formatter).await
        }
    }
}

/// Create the disk and server and boot it.
async fn cmd_start(
    parser: &ConfigParser,
    store: &dyn StateStore,
    formatter: &OutputFormatter,
) -> Result<()> {
    // Everything is read and validated before the first request
    let api = parser.api_settings()?;
    let settings = parser.provision_settings()?;
    let poll = parser.poll_settings()?;

    let validator = ConfigValidator::new();
    validator.validate_api(&api)?;
    let result = validator.validate_provision(&settings)?;
    eprint!("{}", formatter.format_warnings(&result.warnings));

    info!(
        "Provisioning server '{}' in zone {}",
        settings.server.name, api.zone
    );
    let outcome = ProvisionWorkflow::new(&api, &settings, poll, store)
        .run()
        .await?;

    eprintln!("{}", formatter.format_provision(&outcome));
    Ok(())
}

/// Power off and delete the recorded server and disk.
///
/// Without a server record this succeeds without reading credentials.
async fn cmd_stop(
    parser: &ConfigParser,
    store: &dyn StateStore,
    formatter: &OutputFormatter,
) -> Result<()> {
    if store.load_server().await?.is_none() {
        warn!("No server record found. Run 'server start' first.");
        eprintln!("{}", formatter.format_teardown(&TeardownOutcome::NoRecord));
        return Ok(());
    }

    let api = parser.api_settings()?;
    let poll = parser.poll_settings()?;

    let outcome = TeardownWorkflow::new(&api, poll, store).run().await?;

    eprintln!("{}", formatter.format_teardown(&outcome));
    Ok(())
}

/// Show the live status of the recorded server.
async fn cmd_status(
    parser: &ConfigParser,
    store: &dyn StateStore,
    formatter: &OutputFormatter,
) -> Result<()> {
    if store.load_server().await?.is_none() {
        eprintln!("{}", formatter.format_status(None));
        return Ok(());
    }

    let api = parser.api_settings()?;
    let report = observe_server(&api, store).await?;

    eprintln!("{}", formatter.format_status(report.as_ref()));
    Ok(())
}

/// Upload a startup script.
async fn cmd_create_script(
    parser: &ConfigParser,
    store: &dyn StateStore,
    upload: &ScriptUpload,
    formatter: &OutputFormatter,
) -> Result<()> {
    let api = parser.api_settings()?;
    ConfigValidator::new().validate_api(&api)?;

    let record = ScriptRegistrar::new(&api, store).register(upload).await?;

    eprintln!("{}", formatter.format_script(&record));
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the record directory. The flag wins over the env file.
fn resolve_state_dir(flag: Option<PathBuf>, parser: &ConfigParser) -> PathBuf {
    flag.unwrap_or_else(|| parser.state_dir())
}
