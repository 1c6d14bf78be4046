use anyhow::Result;
use schemasync_core::{Config, OpenApiGeneratorCli, Pipeline};

use crate::output::{OutputFormat, Progress};

/// Run the full pipeline and print the report.
pub async fn execute(config: Config, format: OutputFormat, quiet: bool) -> Result<()> {
    let generator = OpenApiGeneratorCli::from_command(&config.generator.command)?;
    let progress = Progress::new(format.is_text() && !quiet);
    let observer = progress.clone();
    let pipeline =
        Pipeline::new(config, generator)?.with_observer(move |event| observer.on_event(event));

    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        },
    };

    if !format.is_text() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
