//! Client code generation.
//!
//! Generation is delegated to an external program. The pipeline only needs
//! the [`Generator`] seam: given a schema file and an empty output directory,
//! fill the directory or fail. [`OpenApiGeneratorCli`] is the production
//! implementation and drives `openapi-generator-cli` with the
//! `typescript-fetch` flavor.
//!
//! ```rust,no_run
//! use schemasync_core::generator::{Generator, OpenApiGeneratorCli};
//! use std::path::Path;
//!
//! # async fn example() -> schemasync_core::Result<()> {
//! let generator = OpenApiGeneratorCli::default();
//! generator
//!     .generate(Path::new("openapi.json"), Path::new("generated"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod cli;

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

pub use cli::{GENERATOR_FLAVOR, OpenApiGeneratorCli};

/// Produces client sources from an OpenAPI document.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Short human-readable name used in logs and progress output.
    fn name(&self) -> &str;

    /// Generate into `out_dir`, which already exists and is empty.
    async fn generate(&self, schema: &Path, out_dir: &Path) -> Result<()>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for std::sync::Arc<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, schema: &Path, out_dir: &Path) -> Result<()> {
        (**self).generate(schema, out_dir).await
    }
}
