//! CLI error handling with exit codes.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Sync failure: no schema found, schema too small, fetch or publish failed, generator missing |
//! | 2 | Invalid arguments or configuration |
//! | n | The generator exited with code `n` |
//!
//! ```bash
//! schemasync
//! case $? in
//!     0) echo "client is up to date" ;;
//!     2) echo "fix schemasync.toml" ;;
//!     *) echo "sync failed" ;;
//! esac
//! ```

use colored::Colorize;
use std::fmt;

/// Exit code category for errors raised by the CLI itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Anything that went wrong while syncing (exit code 1).
    Failure = 1,

    /// Invalid arguments or configuration (exit code 2).
    Usage = 2,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }
}

/// A CLI error with an explicit category.
#[derive(Debug)]
pub struct CliError {
    /// Category deciding the exit code.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    // Display already shows `self.source`, so the chain continues below it.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// Core errors decide their own code; CLI errors use their category;
/// everything else exits with 1.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(core) = err.downcast_ref::<schemasync_core::Error>() {
        return core.exit_code();
    }
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    ErrorCategory::Failure.exit_code()
}

/// Follow-up guidance for an error, if there is any.
#[must_use]
pub fn hint_from_error(err: &anyhow::Error) -> Option<String> {
    err.downcast_ref::<schemasync_core::Error>()
        .and_then(schemasync_core::Error::hint)
}

/// Print `error: ...` and, when available, `hint: ...` to stderr.
pub fn report(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "error:".red().bold());
    if let Some(hint) = hint_from_error(err) {
        eprintln!("{} {hint}", "hint:".yellow().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use schemasync_core::Error;

    #[test]
    fn test_category_exit_codes() {
        assert_eq!(ErrorCategory::Failure.exit_code(), 1);
        assert_eq!(ErrorCategory::Usage.exit_code(), 2);
    }

    #[test]
    fn test_core_errors_keep_their_exit_code() {
        let err = anyhow::Error::new(Error::GeneratorFailed {
            program: "openapi-generator-cli".to_string(),
            code: Some(7),
            stderr: String::new(),
        });
        assert_eq!(exit_code_from_error(&err), 7);

        let err = anyhow::Error::new(Error::Config("bad".to_string()));
        assert_eq!(exit_code_from_error(&err), 2);

        let err = anyhow::Error::new(Error::DiscoveryFailed {
            base_url: "http://localhost:8000".to_string(),
            tried: vec![],
        });
        assert_eq!(exit_code_from_error(&err), 1);
    }

    #[test]
    fn test_context_does_not_hide_core_error() {
        let err = anyhow::Error::new(Error::Config("bad".to_string())).context("loading config");
        assert_eq!(exit_code_from_error(&err), 2);
        assert!(hint_from_error(&err).is_some());
    }

    #[test]
    fn test_cli_error_exit_code() {
        let err = anyhow::Error::new(CliError::usage(anyhow!("schemasync.toml already exists")));
        assert_eq!(exit_code_from_error(&err), 2);
        assert!(hint_from_error(&err).is_none());
    }

    #[test]
    fn test_plain_errors_exit_with_one() {
        assert_eq!(exit_code_from_error(&anyhow!("something broke")), 1);
    }

    #[test]
    fn test_cli_error_display_is_source_message() {
        let err = CliError::usage(anyhow!("bad flag"));
        assert_eq!(err.to_string(), "bad flag");
    }

    #[test]
    fn test_alternate_format_prints_message_once() {
        let err = anyhow::Error::new(CliError::usage(anyhow!("schemasync.toml already exists")));
        assert_eq!(format!("{err:#}"), "schemasync.toml already exists");

        let nested = anyhow::Error::new(CliError::usage(
            anyhow!("permission denied").context("writing schemasync.toml"),
        ));
        assert_eq!(
            format!("{nested:#}"),
            "writing schemasync.toml: permission denied"
        );
    }
}
