use super::Generator;
use crate::config::DEFAULT_GENERATOR_COMMAND;
use crate::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Generator flavor passed to `-g`.
pub const GENERATOR_FLAVOR: &str = "typescript-fetch";

const ADDITIONAL_PROPERTIES: &str = "--additional-properties=withInterfaces=true,supportsES6=true";
const GLOBAL_PROPERTIES: &str =
    "--global-property=apiDocs=false,modelDocs=false,apiTests=false,modelTests=false";

/// Runs `openapi-generator-cli generate` as a child process.
///
/// The command prefix is configurable (for example `npx --yes
/// @openapitools/openapi-generator-cli`, or a locally installed binary); the
/// generation arguments that follow it are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiGeneratorCli {
    program: String,
    prefix_args: Vec<String>,
}

impl Default for OpenApiGeneratorCli {
    fn default() -> Self {
        let [program, prefix_args @ ..] = DEFAULT_GENERATOR_COMMAND;
        Self {
            program: program.to_string(),
            prefix_args: prefix_args.iter().map(ToString::to_string).collect(),
        }
    }
}

impl OpenApiGeneratorCli {
    /// Build from a command prefix: the program followed by its own arguments.
    pub fn from_command(command: &[String]) -> Result<Self> {
        let (program, prefix_args) = command
            .split_first()
            .ok_or_else(|| Error::Config("generator.command must not be empty".to_string()))?;
        if program.trim().is_empty() {
            return Err(Error::Config(
                "generator.command must start with a program name".to_string(),
            ));
        }
        Ok(Self {
            program: program.clone(),
            prefix_args: prefix_args.to_vec(),
        })
    }

    /// Program that gets spawned.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list after the program name.
    #[must_use]
    pub fn arguments(&self, schema: &Path, out_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.prefix_args.iter().map(OsString::from).collect();
        args.extend([
            OsString::from("generate"),
            OsString::from("-i"),
            schema.as_os_str().to_owned(),
            OsString::from("-g"),
            OsString::from(GENERATOR_FLAVOR),
            OsString::from("-o"),
            out_dir.as_os_str().to_owned(),
            OsString::from(ADDITIONAL_PROPERTIES),
            OsString::from(GLOBAL_PROPERTIES),
        ]);
        args
    }
}

#[async_trait]
impl Generator for OpenApiGeneratorCli {
    fn name(&self) -> &str {
        "openapi-generator-cli"
    }

    #[instrument(level = "debug", skip(self), fields(program = %self.program))]
    async fn generate(&self, schema: &Path, out_dir: &Path) -> Result<()> {
        let args = self.arguments(schema, out_dir);
        debug!(?args, "Executing openapi-generator-cli");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::GeneratorNotInstalled {
                    program: self.program.clone(),
                },
                _ => Error::Io(e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim_end(), "generator output");
        }

        if !output.status.success() {
            return Err(Error::GeneratorFailed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}
