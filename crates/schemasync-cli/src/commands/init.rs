use anyhow::{Result, anyhow};
use colored::Colorize;
use schemasync_core::Config;
use schemasync_core::config::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Write the default configuration to `path` (or `./schemasync.toml`).
pub fn execute(path: Option<&Path>, force: bool, quiet: bool) -> Result<PathBuf> {
    let path = path.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf);

    if path.exists() && !force {
        return Err(CliError::usage(anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }

    Config::default().save(&path)?;

    if !quiet {
        println!("{} Wrote {}", "✓".green(), path.display());
    }
    Ok(path)
}
