//! Configuration for the schema sync pipeline.
//!
//! Configuration is a small TOML document with four sections. Every field has a
//! default, so an empty (or missing) file yields a working setup for a backend
//! on `localhost:8000` and a frontend checked out next to it.
//!
//! ## Resolution
//!
//! 1. **Explicit file**: `--config` / `SCHEMASYNC_CONFIG` (must exist)
//! 2. **Working directory**: `./schemasync.toml` when present
//! 3. **Defaults**: [`Config::default`]
//!
//! The CLI applies flag and environment overrides on top of whichever was
//! loaded, then calls [`Config::validate`].
//!
//! ## Example Configuration File
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! probe_paths = ["/openapi.json", "/api/openapi.json", "/api/v1/openapi.json"]
//!
//! [fetch]
//! min_schema_bytes = 100
//!
//! [generator]
//! command = ["npx", "--yes", "@openapitools/openapi-generator-cli"]
//!
//! [publish]
//! frontend_dir = "frontend"
//! output_dir = "src/client"
//! base_url_env = "VITE_API_URL"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// File name looked up in the working directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "schemasync.toml";

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default probe paths, tried in this order.
pub const DEFAULT_PROBE_PATHS: [&str; 3] =
    ["/openapi.json", "/api/openapi.json", "/api/v1/openapi.json"];

/// Default minimum schema size in bytes.
///
/// Anything shorter is almost certainly an error page rather than a schema.
pub const DEFAULT_MIN_SCHEMA_BYTES: usize = 100;

/// Default generator command prefix: `openapi-generator-cli` through `npx`.
pub const DEFAULT_GENERATOR_COMMAND: [&str; 3] =
    ["npx", "--yes", "@openapitools/openapi-generator-cli"];

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the backend lives and how to find its schema.
    pub backend: BackendConfig,
    /// Schema download settings.
    pub fetch: FetchConfig,
    /// External generator invocation.
    pub generator: GeneratorConfig,
    /// Output placement in the frontend project.
    pub publish: PublishConfig,
}

/// Backend location and schema discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the running backend, e.g. `http://localhost:8000`.
    ///
    /// Also baked into the generated `client.ts` as the fallback base URL.
    pub base_url: String,

    /// Paths appended to `base_url`, probed in order until one succeeds.
    pub probe_paths: Vec<String>,
}

/// Schema download settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Bodies shorter than this are rejected as corrupt or empty.
    pub min_schema_bytes: usize,
}

/// How to run the external OpenAPI generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program followed by any prefix arguments.
    ///
    /// The generation arguments themselves are fixed and appended after these.
    pub command: Vec<String>,
}

/// Output placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Root of the frontend project.
    pub frontend_dir: PathBuf,

    /// Client directory, relative to `frontend_dir`. Replaced on every run.
    pub output_dir: PathBuf,

    /// Build-time variable the generated `client.ts` reads its base URL from.
    pub base_url_env: String,

    /// Parent for the per-run scratch directory (defaults to the system temp dir).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            probe_paths: DEFAULT_PROBE_PATHS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_schema_bytes: DEFAULT_MIN_SCHEMA_BYTES,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_GENERATOR_COMMAND.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            frontend_dir: PathBuf::from("frontend"),
            output_dir: PathBuf::from("src").join("client"),
            base_url_env: "VITE_API_URL".to_string(),
            work_dir: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `./schemasync.toml` is used if present, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_file(path);
        }

        let local = Path::new(CONFIG_FILE_NAME);
        if local.exists() {
            Self::load_file(local)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and parse a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] on invalid TOML or mistyped fields.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }

        let content = self.to_toml_string()?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Directory the client is published into.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.publish.frontend_dir.join(&self.publish.output_dir)
    }

    /// Check that the configuration can drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for a bad base URL and [`Error::Config`]
    /// for every other problem.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.backend.base_url).map_err(|e| {
            Error::InvalidUrl(format!("backend.base_url '{}': {e}", self.backend.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "backend.base_url '{}' must use http or https",
                self.backend.base_url
            )));
        }

        if self.backend.probe_paths.is_empty() {
            return Err(Error::Config(
                "backend.probe_paths must list at least one path".to_string(),
            ));
        }
        if let Some(bad) = self.backend.probe_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(Error::Config(format!(
                "probe path '{bad}' must start with '/'"
            )));
        }

        if self.fetch.min_schema_bytes == 0 {
            return Err(Error::Config(
                "fetch.min_schema_bytes must be greater than zero".to_string(),
            ));
        }

        if self.generator.command.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(Error::Config("generator.command must not be empty".to_string()));
        }

        if self.publish.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("publish.output_dir must not be empty".to_string()));
        }

        if !is_identifier(&self.publish.base_url_env) {
            return Err(Error::Config(format!(
                "publish.base_url_env '{}' is not a valid variable name",
                self.publish.base_url_env
            )));
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(
            config.backend.probe_paths,
            vec!["/openapi.json", "/api/openapi.json", "/api/v1/openapi.json"]
        );
        assert_eq!(config.fetch.min_schema_bytes, 100);
        assert_eq!(config.publish.base_url_env, "VITE_API_URL");
        assert_eq!(
            config.destination(),
            PathBuf::from("frontend").join("src").join("client")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() -> Result<()> {
        let config = Config::from_toml_str(
            r#"
            [backend]
            base_url = "http://127.0.0.1:9000"

            [fetch]
            min_schema_bytes = 512
            "#,
        )?;

        assert_eq!(config.backend.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.backend.probe_paths.len(), 3);
        assert_eq!(config.fetch.min_schema_bytes, 512);
        assert_eq!(config.generator, GeneratorConfig::default());
        Ok(())
    }

    #[test]
    fn test_empty_toml_is_default() -> Result<()> {
        assert_eq!(Config::from_toml_str("")?, Config::default());
        Ok(())
    }

    #[test]
    fn test_config_save_and_load_roundtrip() -> Result<()> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.publish.work_dir = Some(PathBuf::from("/var/tmp"));
        config.generator.command = vec!["openapi-generator-cli".to_string()];
        config.save(&path)?;

        let loaded = Config::load(Some(path.as_path()))?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");

        match Config::load(Some(missing.as_path())) {
            Err(Error::Config(msg)) => assert!(msg.contains("not found")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_parse_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[backend\nbase_url = ").unwrap();

        match Config::load_file(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("Failed to parse config")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.backend.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        config.backend.base_url = "ftp://localhost".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_rejects_bad_probe_paths() {
        let mut config = Config::default();
        config.backend.probe_paths.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.backend.probe_paths = vec!["openapi.json".to_string()];
        match config.validate() {
            Err(Error::Config(msg)) => assert!(msg.contains("must start with '/'")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_threshold_and_empty_command() {
        let mut config = Config::default();
        config.fetch.min_schema_bytes = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.generator.command = vec![];
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.generator.command = vec!["  ".to_string()];
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_env_var_name() {
        let mut config = Config::default();
        for good in ["VITE_API_URL", "_X", "NEXT_PUBLIC_API_URL2"] {
            config.publish.base_url_env = good.to_string();
            assert!(config.validate().is_ok(), "{good} should be accepted");
        }
        for bad in ["", "1ABC", "VITE-API", "A B"] {
            config.publish.base_url_env = bad.to_string();
            assert!(config.validate().is_err(), "{bad} should be rejected");
        }
    }
}
