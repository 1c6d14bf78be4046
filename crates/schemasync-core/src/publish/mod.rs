//! Publishing generated clients into the frontend.
//!
//! The destination directory is rebuilt from scratch on every run: a fixed
//! subset of the generator output (see [`PublishLayout`]) plus two authored
//! files rendered from [`TemplateContext`]. Nothing from a previous run
//! survives.
//!
//! The new tree is assembled in a staging directory next to the destination
//! and swapped in with renames, so a failure while copying never leaves the
//! destination half-cleared.

mod digest;
mod layout;
mod templates;

use crate::config::Config;
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub use digest::{TreeDigest, digest_tree};
pub use layout::{EntryKind, GeneratedEntry, PublishLayout};
pub use templates::TemplateContext;

const STAGING_PREFIX: &str = ".schemasync-";
const PREVIOUS_DIR_NAME: &str = "previous";

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    /// Directory that was replaced.
    pub destination: PathBuf,
    /// Top-level entries now in the destination.
    pub entries: Vec<String>,
    /// Number of files in the published tree.
    pub file_count: usize,
    /// Digest of the published tree (see [`digest_tree`]).
    pub digest: String,
}

/// Replaces a destination directory with a freshly generated client.
#[derive(Debug, Clone)]
pub struct Publisher {
    destination: PathBuf,
    context: TemplateContext,
}

impl Publisher {
    /// Publisher for an explicit destination.
    #[must_use]
    pub const fn new(destination: PathBuf, context: TemplateContext) -> Self {
        Self {
            destination,
            context,
        }
    }

    /// Publisher for the destination described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.destination(), TemplateContext::from_config(config))
    }

    /// Directory that gets replaced.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Replace the destination with the selected entries of `generated_dir`.
    ///
    /// The generator output is checked before anything is written. The
    /// destination's parent directory is created if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Publish`] if the generator output is incomplete or any
    /// filesystem operation fails. On error the previous destination, if any,
    /// is left in place. If it was already moved aside and cannot be moved
    /// back, the staging directory is kept and the error names where the
    /// previous client is.
    #[instrument(skip(self, generated_dir), fields(destination = %self.destination.display()))]
    pub fn publish(&self, generated_dir: &Path) -> Result<PublishReport> {
        self.publish_with(generated_dir, |from, to| fs::rename(from, to))
    }

    fn publish_with<R>(&self, generated_dir: &Path, rename: R) -> Result<PublishReport>
    where
        R: Fn(&Path, &Path) -> io::Result<()>,
    {
        PublishLayout::verify(generated_dir)?;

        let parent = match self.destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| {
            Error::Publish(format!("Failed to create {}: {e}", parent.display()))
        })?;

        // Same parent as the destination, so the swap is a plain rename
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| Error::Publish(format!("Failed to create staging directory: {e}")))?;
        let assembled = staging.path().join("out");
        self.assemble(generated_dir, &assembled)?;

        let previous = staging.path().join(PREVIOUS_DIR_NAME);
        if let Err(message) = self.swap(&assembled, &previous, rename) {
            // A previous tree still in staging could not be restored: keep it
            if fs::symlink_metadata(&previous).is_ok() {
                let kept = staging.keep().join(PREVIOUS_DIR_NAME);
                return Err(Error::Publish(format!(
                    "{message}; previous client left at {}",
                    kept.display()
                )));
            }
            return Err(Error::Publish(message));
        }

        if let Err(e) = staging.close() {
            warn!("Failed to remove staging directory: {e}");
        }

        let digest = digest_tree(&self.destination)?;
        let report = PublishReport {
            destination: self.destination.clone(),
            entries: PublishLayout::entries()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            file_count: digest.file_count,
            digest: digest.sha256,
        };
        info!(
            "Published {} files to {}",
            report.file_count,
            self.destination.display()
        );
        Ok(report)
    }

    fn assemble(&self, generated_dir: &Path, target: &Path) -> Result<()> {
        fs::create_dir(target)
            .map_err(|e| Error::Publish(format!("Failed to create staging output: {e}")))?;

        for entry in PublishLayout::GENERATED {
            let from = generated_dir.join(entry.name);
            let to = target.join(entry.name);
            match entry.kind {
                EntryKind::Dir => copy_directory(&from, &to)?,
                EntryKind::File => copy_file(&from, &to)?,
            }
        }

        write_file(
            &target.join(PublishLayout::CLIENT_FILE),
            &self.context.render_client(),
        )?;
        write_file(
            &target.join(PublishLayout::README_FILE),
            &self.context.render_readme(),
        )?;
        Ok(())
    }

    fn swap<R>(
        &self,
        assembled: &Path,
        previous: &Path,
        rename: R,
    ) -> std::result::Result<(), String>
    where
        R: Fn(&Path, &Path) -> io::Result<()>,
    {
        let had_previous = fs::symlink_metadata(&self.destination).is_ok();
        if had_previous {
            rename(&self.destination, previous).map_err(|e| {
                format!("Failed to move aside {}: {e}", self.destination.display())
            })?;
        }

        if let Err(e) = rename(assembled, &self.destination) {
            if had_previous {
                if let Err(restore) = rename(previous, &self.destination) {
                    warn!(
                        "Failed to restore previous {}: {restore}",
                        self.destination.display()
                    );
                }
            }
            return Err(format!(
                "Failed to move new client into {}: {e}",
                self.destination.display()
            ));
        }

        debug!(had_previous, "swapped staging into place");
        Ok(())
    }
}

fn copy_directory(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)
        .map_err(|e| Error::Publish(format!("Failed to create {}: {e}", to.display())))?;

    for entry in fs::read_dir(from)
        .map_err(|e| Error::Publish(format!("Failed to read {}: {e}", from.display())))?
    {
        let entry =
            entry.map_err(|e| Error::Publish(format!("Failed to read directory entry: {e}")))?;
        let path = entry.path();
        let target_path = to.join(entry.file_name());

        if path.is_dir() {
            copy_directory(&path, &target_path)?;
        } else {
            copy_file(&path, &target_path)?;
        }
    }

    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| Error::Publish(format!("Failed to copy {}: {e}", from.display())))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .map_err(|e| Error::Publish(format!("Failed to write {}: {e}", path.display())))
}
