use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Content digest of a directory tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDigest {
    /// Base64 `SHA256` over every relative path and file body.
    pub sha256: String,
    /// Number of regular files in the tree.
    pub file_count: usize,
}

/// Hash a directory tree independent of traversal order and timestamps.
///
/// Entries are visited in sorted relative-path order (with `/` separators on
/// every platform). Directories contribute their path, so an empty directory
/// still changes the digest. Two trees with the same digest have the same
/// names, layout and bytes.
///
/// # Errors
///
/// Returns [`Error::Publish`] if the tree cannot be read.
pub fn digest_tree(root: &Path) -> Result<TreeDigest> {
    let mut entries = Vec::new();
    collect(root, "", &mut entries)?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    let mut file_count = 0;
    for (relative, contents) in &entries {
        hasher.update(relative.as_bytes());
        hasher.update([0]);
        match contents {
            Some(bytes) => {
                file_count += 1;
                hasher.update((bytes.len() as u64).to_le_bytes());
                hasher.update(bytes);
            },
            None => hasher.update(b"/"),
        }
    }

    Ok(TreeDigest {
        sha256: STANDARD.encode(hasher.finalize()),
        file_count,
    })
}

fn collect(dir: &Path, prefix: &str, out: &mut Vec<(String, Option<Vec<u8>>)>) -> Result<()> {
    let read_dir = fs::read_dir(dir)
        .map_err(|e| Error::Publish(format!("Failed to read {}: {e}", dir.display())))?;

    for entry in read_dir {
        let entry =
            entry.map_err(|e| Error::Publish(format!("Failed to read directory entry: {e}")))?;
        let path = entry.path();
        let relative = format!("{prefix}{}", entry.file_name().to_string_lossy());

        if path.is_dir() {
            collect(&path, &format!("{relative}/"), out)?;
            out.push((relative, None));
        } else {
            let bytes = fs::read(&path)
                .map_err(|e| Error::Publish(format!("Failed to read {}: {e}", path.display())))?;
            out.push((relative, Some(bytes)));
        }
    }
    Ok(())
}
