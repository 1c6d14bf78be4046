//! schemasync CLI library entry point.
//!
//! The binary is a thin wrapper around [`run`]; exit codes and error output
//! live in [`error`].

pub mod cli;
mod commands;
pub mod error;
pub mod output;
mod utils;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use schemasync_core::Config;
use std::path::Path;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::utils::logging::initialize_logging;

/// Parse arguments, set up logging and run the selected command.
///
/// # Errors
///
/// Returns the first error raised by the command. Use
/// [`error::exit_code_from_error`] to map it to a process exit code.
pub async fn run() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    Cli::check_flag_placement(&matches)?;
    initialize_logging(&cli)?;
    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Some(Commands::Init { force }) => {
            commands::write_default_config(cli.config.as_deref(), force, quiet)?;
        },

        Some(Commands::Discover(args)) => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(url) = args.backend_url {
                config.backend.base_url = url;
            }
            commands::discover_schema(config, args.format, quiet).await?;
        },

        Some(Commands::Sync(args)) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.overrides.apply(&mut config)?;
            commands::sync_client(config, args.format, quiet).await?;
        },

        None => {
            let mut config = load_config(cli.config.as_deref())?;
            cli.sync.overrides.apply(&mut config)?;
            commands::sync_client(config, cli.sync.format, quiet).await?;
        },
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = Config::load(explicit)?;
    debug!(?config, "loaded configuration");
    Ok(config)
}
