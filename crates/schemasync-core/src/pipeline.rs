//! The sync pipeline: discover, fetch, generate, publish.
//!
//! Stages run strictly in order and the first failure aborts the run. All
//! intermediate files live in a per-run workspace directory that is removed
//! when the run ends, whichever way it ends. The destination is only touched
//! once generation has succeeded.

use crate::config::Config;
use crate::discovery::{DiscoveredEndpoint, Discoverer};
use crate::fetcher::SchemaFetcher;
use crate::generator::Generator;
use crate::publish::{PublishReport, Publisher};
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tracing::{info, instrument, warn};

/// File name of the downloaded schema inside the workspace.
pub const SCHEMA_FILE_NAME: &str = "openapi.json";

const GENERATED_DIR_NAME: &str = "generated";
const WORKSPACE_PREFIX: &str = "schemasync-";

/// Progress notifications emitted while a run advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Probing is about to start.
    Discovering {
        /// Backend base URL.
        base_url: String,
        /// Number of candidate URLs.
        candidates: usize,
    },
    /// A schema URL answered.
    Discovered(DiscoveredEndpoint),
    /// The schema passed the size check.
    Fetched {
        /// Schema URL.
        url: String,
        /// Body size in bytes.
        size: usize,
    },
    /// The generator is about to run.
    Generating {
        /// Generator name.
        generator: String,
    },
    /// The generator finished successfully.
    Generated,
    /// The destination was replaced.
    Published(PublishReport),
}

type Observer = Box<dyn Fn(&PipelineEvent) + Send + Sync>;

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// URL the schema was downloaded from.
    pub schema_url: String,
    /// Probe path that matched.
    pub probe_path: String,
    /// Schema size in bytes.
    pub schema_bytes: usize,
    /// Base64 `SHA256` of the schema.
    pub schema_sha256: String,
    /// `openapi` version declared by the schema, when readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi_version: Option<String>,
    /// Publish outcome.
    pub publish: PublishReport,
}

/// One configured sync run.
pub struct Pipeline<G> {
    config: Config,
    generator: G,
    observer: Option<Observer>,
}

impl<G: Generator> Pipeline<G> {
    /// Build a pipeline after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::InvalidUrl`] for an unusable
    /// configuration.
    pub fn new(config: Config, generator: G) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generator,
            observer: None,
        })
    }

    /// Register a callback for [`PipelineEvent`]s.
    #[must_use]
    pub fn with_observer(
        mut self,
        observer: impl Fn(&PipelineEvent) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Probe for the schema URL without downloading anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryFailed`] when no candidate answers.
    #[instrument(skip(self), fields(base_url = %self.config.backend.base_url))]
    pub async fn discover_only(&self) -> Result<DiscoveredEndpoint> {
        let discoverer =
            Discoverer::new(&self.config.backend.base_url, &self.config.backend.probe_paths)?;
        self.emit(PipelineEvent::Discovering {
            base_url: self.config.backend.base_url.clone(),
            candidates: discoverer.candidates().len(),
        });

        let endpoint = discoverer.discover().await?;
        self.emit(PipelineEvent::Discovered(endpoint.clone()));
        Ok(endpoint)
    }

    /// Run every stage and replace the destination.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails. Nothing after that
    /// stage runs, and the destination is unchanged unless publishing itself
    /// was reached.
    #[instrument(skip(self), fields(destination = %self.config.destination().display()))]
    pub async fn run(&self) -> Result<SyncReport> {
        let endpoint = self.discover_only().await?;

        let fetcher = SchemaFetcher::new(self.config.fetch.min_schema_bytes)?;
        let schema = fetcher.fetch(&endpoint.url).await?;
        self.emit(PipelineEvent::Fetched {
            url: schema.url().to_string(),
            size: schema.len(),
        });

        let workspace = self.workspace()?;
        let schema_path = workspace.path().join(SCHEMA_FILE_NAME);
        schema.write_to(&schema_path)?;
        let generated = workspace.path().join(GENERATED_DIR_NAME);
        fs::create_dir(&generated)?;

        self.emit(PipelineEvent::Generating {
            generator: self.generator.name().to_string(),
        });
        self.generator.generate(&schema_path, &generated).await?;
        self.emit(PipelineEvent::Generated);

        let publish = Publisher::from_config(&self.config).publish(&generated)?;
        self.emit(PipelineEvent::Published(publish.clone()));

        if let Err(e) = workspace.close() {
            warn!("Failed to remove workspace: {e}");
        }

        info!("Synced client from {}", endpoint.url);
        Ok(SyncReport {
            schema_url: endpoint.url,
            probe_path: endpoint.probe_path,
            schema_bytes: schema.len(),
            schema_sha256: schema.sha256().to_string(),
            openapi_version: schema.openapi_version(),
            publish,
        })
    }

    fn workspace(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        match &self.config.publish.work_dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| {
                    Error::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create work dir {}: {e}", dir.display()),
                    ))
                })?;
                Ok(builder.tempdir_in(dir)?)
            },
            None => Ok(builder.tempdir()?),
        }
    }

    /// Destination that [`Pipeline::run`] replaces.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.config.destination()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct NeverCalled;

    #[async_trait]
    impl Generator for NeverCalled {
        fn name(&self) -> &str {
            "never"
        }

        async fn generate(&self, _schema: &std::path::Path, _out: &std::path::Path) -> Result<()> {
            Err(Error::Publish("generator should not run".to_string()))
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.backend.base_url = "not a url".to_string();
        assert!(matches!(
            Pipeline::new(config, NeverCalled),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_uncreatable_work_dir_is_io_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let mut config = Config::default();
        config.publish.work_dir = Some(blocker.join("scratch"));
        let pipeline = Pipeline::new(config, NeverCalled).unwrap();

        let err = pipeline.workspace().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Failed to create work dir"));
    }

    #[tokio::test]
    async fn test_discover_only_emits_events_on_failure() {
        let mut config = Config::default();
        // Reserved port, nothing listens here
        config.backend.base_url = "http://127.0.0.1:9".to_string();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let pipeline = Pipeline::new(config, NeverCalled)
            .unwrap()
            .with_observer(move |event| sink.lock().unwrap().push(event.clone()));

        let result = pipeline.discover_only().await;

        assert!(matches!(result, Err(Error::DiscoveryFailed { .. })));
        assert_eq!(
            *events.lock().unwrap(),
            vec![PipelineEvent::Discovering {
                base_url: "http://127.0.0.1:9".to_string(),
                candidates: 3,
            }]
        );
    }
}
