//! Logging initialization and color control.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Commands};
use crate::output::OutputFormat;

/// Initialize the tracing subscriber from CLI flags.
///
/// Logs go to stderr. JSON output drops the level to errors and turns colors
/// off unless `--verbose` was given, so stdout carries only the report.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let mut level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let machine_output = matches!(selected_format(cli), OutputFormat::Json);
    if machine_output && !cli.verbose {
        level = Level::ERROR;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Color control: disable when requested, NO_COLOR is set, or when emitting machine output
    let env_no_color = std::env::var_os("NO_COLOR").is_some();
    if cli.no_color || env_no_color || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}

fn selected_format(cli: &Cli) -> OutputFormat {
    match &cli.command {
        None => cli.sync.format,
        Some(Commands::Sync(args)) => args.format,
        Some(Commands::Discover(args)) => args.format,
        Some(Commands::Init { .. }) => OutputFormat::Text,
    }
}
