use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Whether a generated entry is a directory or a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Copied recursively.
    Dir,
    /// Copied as-is.
    File,
}

/// One entry carried over from the generator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedEntry {
    /// Name relative to the generator output root.
    pub name: &'static str,
    /// Expected kind.
    pub kind: EntryKind,
}

/// The fixed shape of a published client directory.
///
/// Frontend code imports from these paths, so they never change between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishLayout;

impl PublishLayout {
    /// Generated entries copied into the destination, in copy order.
    pub const GENERATED: [GeneratedEntry; 4] = [
        GeneratedEntry {
            name: "apis",
            kind: EntryKind::Dir,
        },
        GeneratedEntry {
            name: "models",
            kind: EntryKind::Dir,
        },
        GeneratedEntry {
            name: "runtime.ts",
            kind: EntryKind::File,
        },
        GeneratedEntry {
            name: "index.ts",
            kind: EntryKind::File,
        },
    ];

    /// Authored client wrapper.
    pub const CLIENT_FILE: &'static str = "client.ts";

    /// Authored usage README.
    pub const README_FILE: &'static str = "README.md";

    /// Every top-level entry of a published directory, in publish order.
    #[must_use]
    pub fn entries() -> Vec<&'static str> {
        Self::GENERATED
            .iter()
            .map(|entry| entry.name)
            .chain([Self::CLIENT_FILE, Self::README_FILE])
            .collect()
    }

    /// Check that `generated_dir` holds every entry with the expected kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Publish`] naming the first missing or mistyped entry.
    pub fn verify(generated_dir: &Path) -> Result<()> {
        for entry in Self::GENERATED {
            let path = generated_dir.join(entry.name);
            let metadata = fs::metadata(&path).map_err(|e| {
                Error::Publish(format!(
                    "Generator output is missing '{}': {e}",
                    entry.name
                ))
            })?;

            let kind_matches = match entry.kind {
                EntryKind::Dir => metadata.is_dir(),
                EntryKind::File => metadata.is_file(),
            };
            if !kind_matches {
                return Err(Error::Publish(format!(
                    "Generator output '{}' should be a {}",
                    entry.name,
                    match entry.kind {
                        EntryKind::Dir => "directory",
                        EntryKind::File => "file",
                    }
                )));
            }
        }
        Ok(())
    }
}
