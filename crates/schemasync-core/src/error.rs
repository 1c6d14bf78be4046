//! Error types and handling for schemasync-core operations.
//!
//! Every stage of the sync pipeline reports failures through [`Error`]. There is
//! no retry logic anywhere in the pipeline: every error is fatal and aborts the
//! run. Errors still carry enough metadata for the CLI to pick an exit code and
//! print an actionable hint.
//!
//! ## Error Categories
//!
//! - **Discovery**: no candidate schema URL answered successfully
//! - **Schema**: the fetched document is too small to be a real schema
//! - **Generator**: the external code generator is missing or exited non-zero
//! - **Publish**: a filesystem operation failed while replacing the output
//! - **Network / I/O / Config**: the usual plumbing failures
//!
//! ## Example
//!
//! ```rust
//! use schemasync_core::Error;
//!
//! let err = Error::DiscoveryFailed {
//!     base_url: "http://localhost:8000".to_string(),
//!     tried: vec!["http://localhost:8000/openapi.json".to_string()],
//! };
//! assert_eq!(err.category(), "discovery");
//! assert_eq!(err.exit_code(), 1);
//! assert!(err.hint().is_some());
//! ```

use thiserror::Error;

/// The main error type for schemasync-core operations.
///
/// `Display` gives the user-facing message. [`Error::hint`] gives optional
/// follow-up guidance, and [`Error::exit_code`] gives the process exit code
/// the CLI should use.
#[derive(Error, Debug)]
pub enum Error {
    /// None of the probe URLs responded with a success status.
    ///
    /// Raised before anything is downloaded or written.
    #[error("No OpenAPI schema found at {base_url} (tried: {})", .tried.join(", "))]
    DiscoveryFailed {
        /// Backend base URL the probes were built from.
        base_url: String,
        /// Every candidate URL, in the order it was probed.
        tried: Vec<String>,
    },

    /// The fetched schema is below the minimum size threshold.
    ///
    /// A misconfigured backend can answer `200 OK` with a short error page;
    /// this catches it before generation. The body is echoed for diagnosis.
    #[error(
        "Schema from {url} is only {size} bytes (minimum {min_bytes}); response was:\n{content}"
    )]
    SchemaTooSmall {
        /// URL the schema was fetched from.
        url: String,
        /// Size of the body in bytes.
        size: usize,
        /// Configured minimum size.
        min_bytes: usize,
        /// Body decoded as (lossy) UTF-8.
        content: String,
    },

    /// The generator executable could not be spawned.
    #[error("OpenAPI generator '{program}' could not be started (not installed or not in PATH)")]
    GeneratorNotInstalled {
        /// Program that failed to spawn.
        program: String,
    },

    /// The generator ran but exited unsuccessfully.
    ///
    /// `stderr` is carried verbatim; it is not interpreted.
    #[error("OpenAPI generator '{program}' failed ({}){}", describe_exit(.code), format_stderr(.stderr))]
    GeneratorFailed {
        /// Program that was run.
        program: String,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// Replacing the published output directory failed.
    ///
    /// Covers validation of the generator output, staging copies, authored
    /// file writes and the final swap.
    #[error("Publish error: {0}")]
    Publish(String),

    /// Network operation failed.
    ///
    /// Covers both transport failures and non-success statuses from the
    /// strict schema download.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The schema download ended on a status that is neither success nor an
    /// HTTP error, e.g. a redirect that was not followed.
    #[error("Network error: {url} answered with HTTP {status}")]
    HttpStatus {
        /// URL that was requested.
        url: String,
        /// Final status code.
        status: u16,
    },

    /// Requested resource was not found (HTTP 404 on the schema download).
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O operation failed outside of publishing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[allow(clippy::ref_option)]
fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_string(),
        |code| format!("exit code {code}"),
    )
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// - `"discovery"` - no schema URL found
    /// - `"schema"` - fetched schema rejected by the size check
    /// - `"generator"` - generator missing or failed
    /// - `"publish"` - output directory replacement failed
    /// - `"network"`, `"not_found"`, `"io"`, `"config"`, `"invalid_url"`,
    ///   `"serialization"` - plumbing failures
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::DiscoveryFailed { .. } => "discovery",
            Self::SchemaTooSmall { .. } => "schema",
            Self::GeneratorNotInstalled { .. } | Self::GeneratorFailed { .. } => "generator",
            Self::Publish(_) => "publish",
            Self::Network(_) | Self::HttpStatus { .. } => "network",
            Self::NotFound(_) => "not_found",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Actionable guidance to print after the error message, if any.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::DiscoveryFailed { base_url, .. } => Some(format!(
                "Is the backend running? Start it first (for example `uvicorn app.main:app --reload --port 8000`) and check that it is reachable at {base_url}"
            )),
            Self::SchemaTooSmall { min_bytes, .. } => Some(format!(
                "The backend answered with something that is not an OpenAPI document. Check the backend logs, or lower fetch.min_schema_bytes (currently {min_bytes}) if the schema really is that small"
            )),
            Self::GeneratorNotInstalled { .. } => Some(
                "Install Node.js and `npm install -g @openapitools/openapi-generator-cli`, or point generator.command at an installed generator".to_string(),
            ),
            Self::Config(_) | Self::InvalidUrl(_) => {
                Some("Check schemasync.toml and any SCHEMASYNC_* environment variables".to_string())
            },
            _ => None,
        }
    }

    /// Process exit code for this error.
    ///
    /// A failing generator propagates its own exit code so callers see exactly
    /// what the external tool reported. Configuration problems exit with `2`;
    /// every other failure exits with `1`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::GeneratorFailed {
                code: Some(code), ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            Self::Config(_) | Self::InvalidUrl(_) => 2,
            _ => 1,
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
