use anyhow::Result;
use schemasync_core::{Config, OpenApiGeneratorCli, Pipeline};

use crate::output::{OutputFormat, Progress};

/// Probe for the schema URL without fetching or generating anything.
///
/// Text output reuses the sync progress line; `--quiet` prints the bare URL
/// so it can be captured by scripts.
pub async fn execute(config: Config, format: OutputFormat, quiet: bool) -> Result<()> {
    let generator = OpenApiGeneratorCli::from_command(&config.generator.command)?;
    let progress = Progress::new(format.is_text() && !quiet);
    let observer = progress.clone();
    let pipeline =
        Pipeline::new(config, generator)?.with_observer(move |event| observer.on_event(event));

    let endpoint = match pipeline.discover_only().await {
        Ok(endpoint) => endpoint,
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        },
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&endpoint)?),
        OutputFormat::Text if quiet => println!("{}", endpoint.url),
        OutputFormat::Text => {},
    }
    Ok(())
}
