//! Output format selection and progress reporting.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use schemasync_core::PipelineEvent;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Output formats supported by the CLI.
///
/// - **Text**: check-marked progress lines and a spinner while the generator
///   runs
/// - **Json**: only the final report, pretty-printed on stdout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

impl OutputFormat {
    /// Whether this format is meant for people.
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Renders [`PipelineEvent`]s as progress output.
///
/// Cheap to clone; clones share the same spinner slot.
#[derive(Clone)]
pub struct Progress {
    enabled: bool,
    spinner: Arc<Mutex<Option<ProgressBar>>>,
}

impl Progress {
    /// Progress output, or a silent sink when `enabled` is false.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            spinner: Arc::new(Mutex::new(None)),
        }
    }

    /// Print progress for one event.
    pub fn on_event(&self, event: &PipelineEvent) {
        if !self.enabled {
            return;
        }

        match event {
            PipelineEvent::Discovering {
                base_url,
                candidates,
            } => self.spin(format!("Probing {candidates} schema paths on {base_url}")),
            PipelineEvent::Discovered(endpoint) => {
                self.abandon();
                println!("{} Found schema at {}", "✓".green(), endpoint.url.cyan());
            },
            PipelineEvent::Fetched { size, .. } => {
                println!("{} Fetched schema ({size} bytes)", "✓".green());
            },
            PipelineEvent::Generating { generator } => {
                self.spin(format!("Generating client with {generator}"));
            },
            PipelineEvent::Generated => {
                self.abandon();
                println!("{} Generated client", "✓".green());
            },
            PipelineEvent::Published(report) => {
                println!(
                    "{} Published {} files to {}",
                    "✓".green(),
                    report.file_count,
                    report.destination.display().to_string().cyan()
                );
            },
        }
    }

    /// Clear the running spinner, if any.
    pub fn abandon(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }

    fn spin(&self, message: String) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }
}
