//! # schemasync-core
//!
//! Core pipeline for keeping a frontend's generated API client in sync with a
//! running backend's OpenAPI schema.
//!
//! A run is a straight line with no state carried between runs:
//!
//! - **Discovery**: probe a fixed list of schema paths on the backend and take
//!   the first that answers
//! - **Fetch**: download the schema strictly and reject bodies too small to be
//!   a real schema
//! - **Generate**: hand the schema to an external OpenAPI generator
//! - **Publish**: replace the client directory with the generated subset plus
//!   an authored `client.ts` and `README.md`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use schemasync_core::{Config, OpenApiGeneratorCli, Pipeline};
//!
//! # async fn example() -> schemasync_core::Result<()> {
//! let config = Config::load(None)?;
//! let pipeline = Pipeline::new(config, OpenApiGeneratorCli::default())?;
//! let report = pipeline.run().await?;
//! println!("published {} files", report.publish.file_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is fatal. Errors carry a category, an optional hint and the
//! exit code a CLI should use:
//!
//! ```rust
//! use schemasync_core::Error;
//!
//! let err = Error::Config("generator.command must not be empty".to_string());
//! assert_eq!(err.exit_code(), 2);
//! ```

/// Configuration file loading and validation
pub mod config;
/// Schema URL discovery
pub mod discovery;
/// Error types and result aliases
pub mod error;
/// Strict schema download
pub mod fetcher;
/// External client generators
pub mod generator;
/// Sequential sync pipeline
pub mod pipeline;
/// Publishing into the frontend
pub mod publish;

// Re-export commonly used types
pub use config::Config;
pub use discovery::{DiscoveredEndpoint, Discoverer};
pub use error::{Error, Result};
pub use fetcher::{SchemaDocument, SchemaFetcher};
pub use generator::{Generator, OpenApiGeneratorCli};
pub use pipeline::{Pipeline, PipelineEvent, SyncReport};
pub use publish::{PublishLayout, PublishReport, Publisher, TemplateContext, digest_tree};
