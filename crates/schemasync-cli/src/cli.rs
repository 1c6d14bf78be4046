//! # CLI Structure and Argument Parsing
//!
//! `schemasync` with no subcommand runs a full sync using the configuration
//! file (if any) and defaults, so the common case needs no flags at all.
//!
//! ```bash
//! # Regenerate frontend/src/client from http://localhost:8000
//! schemasync
//!
//! # Same thing, spelled out, against another backend
//! schemasync sync --backend-url http://127.0.0.1:9000 --format json
//!
//! # Only find the schema URL
//! schemasync discover
//!
//! # Write a schemasync.toml with the defaults
//! schemasync init
//! ```
//!
//! Every sync override can also come from a `SCHEMASYNC_*` environment
//! variable. Flags win over the environment, which wins over the file.

use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, Parser, Subcommand};
use schemasync_core::Config;
use std::path::PathBuf;

use crate::error::CliError;
use crate::output::OutputFormat;

/// Main CLI structure for the `schemasync` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "schemasync")]
#[command(version)]
#[command(
    about = "Regenerate a frontend API client from a running backend's OpenAPI schema",
    long_about = None
)]
pub struct Cli {
    /// Subcommand to run; `sync` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sync options used when no subcommand is given
    #[command(flatten)]
    pub sync: SyncArgs,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also honors `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to ./schemasync.toml when present)
    #[arg(long, global = true, env = "SCHEMASYNC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Reject sync flags typed before a subcommand, where they would be
    /// silently ignored (`schemasync --backend-url X discover`).
    ///
    /// Only values from the command line count; `SCHEMASYNC_*` variables
    /// and global flags are fine anywhere.
    pub fn check_flag_placement(matches: &ArgMatches) -> Result<(), CliError> {
        let Some(subcommand) = matches.subcommand_name() else {
            return Ok(());
        };

        let command = Self::command();
        let misplaced: Vec<String> = command
            .get_arguments()
            .filter(|arg| !arg.is_global_set())
            .filter(|arg| {
                matches.value_source(arg.get_id().as_str()) == Some(ValueSource::CommandLine)
            })
            .map(|arg| {
                arg.get_long()
                    .map_or_else(|| arg.get_id().to_string(), |long| format!("--{long}"))
            })
            .collect();

        if misplaced.is_empty() {
            return Ok(());
        }
        Err(CliError::usage(anyhow::anyhow!(
            "{} must come after '{subcommand}' (e.g. schemasync {subcommand} {})",
            misplaced.join(", "),
            misplaced[0]
        )))
    }
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Discover, fetch, generate and publish the client (default)
    Sync(SyncArgs),

    /// Probe the backend for its schema URL and print it
    Discover(DiscoverArgs),

    /// Write a schemasync.toml populated with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for `sync`.
#[derive(Args, Clone, Debug, Default)]
pub struct SyncArgs {
    /// Configuration overrides
    #[command(flatten)]
    pub overrides: Overrides,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for `discover`.
#[derive(Args, Clone, Debug, Default)]
pub struct DiscoverArgs {
    /// Backend base URL
    #[arg(long, env = "SCHEMASYNC_BACKEND_URL", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Per-run overrides layered on top of the configuration file.
#[derive(Args, Clone, Debug, Default)]
pub struct Overrides {
    /// Backend base URL
    #[arg(long, env = "SCHEMASYNC_BACKEND_URL", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Frontend project root
    #[arg(long, env = "SCHEMASYNC_FRONTEND_DIR", value_name = "DIR")]
    pub frontend_dir: Option<PathBuf>,

    /// Client directory relative to the frontend root
    #[arg(long, env = "SCHEMASYNC_OUTPUT_DIR", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Reject schemas smaller than this many bytes
    #[arg(long, env = "SCHEMASYNC_MIN_SCHEMA_BYTES", value_name = "N")]
    pub min_schema_bytes: Option<usize>,

    /// Generator command prefix, split on whitespace
    /// (e.g. "openapi-generator-cli" or "npx --yes @openapitools/openapi-generator-cli")
    #[arg(long, env = "SCHEMASYNC_GENERATOR", value_name = "CMD")]
    pub generator: Option<String>,

    /// Directory for per-run scratch files (defaults to the system temp dir)
    #[arg(long, env = "SCHEMASYNC_WORK_DIR", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

impl Overrides {
    /// Apply every override that was given.
    pub fn apply(&self, config: &mut Config) -> Result<(), CliError> {
        if let Some(url) = &self.backend_url {
            config.backend.base_url.clone_from(url);
        }
        if let Some(dir) = &self.frontend_dir {
            config.publish.frontend_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output_dir {
            config.publish.output_dir.clone_from(dir);
        }
        if let Some(bytes) = self.min_schema_bytes {
            config.fetch.min_schema_bytes = bytes;
        }
        if let Some(command) = &self.generator {
            let command: Vec<String> = command.split_whitespace().map(ToString::to_string).collect();
            if command.is_empty() {
                return Err(CliError::usage(anyhow::anyhow!(
                    "--generator needs at least a program name"
                )));
            }
            config.generator.command = command;
        }
        if let Some(dir) = &self.work_dir {
            config.publish.work_dir = Some(dir.clone());
        }
        Ok(())
    }
}
