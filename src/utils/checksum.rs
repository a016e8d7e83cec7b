//! Content digests for vendored modules and patch sets.
//!
//! A [`Digest`] is `sha256:` followed by lower-case hex. Directory digests are
//! computed over the sorted list of `"<relative path>:<file digest>\n"`
//! lines, so the result depends only on file names and bytes, never on the
//! order in which the filesystem lists entries. File-list digests keep the
//! declared order, because patch order matters.

use crate::core::file_error::{FileOperation, FileResultExt};
use crate::manifest::is_within;
use crate::utils::fs::{relative_slash_path, workspace_path};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

const ALGORITHM_PREFIX: &str = "sha256:";

/// A content fingerprint, compared by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Digest of a byte slice.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(format!("{ALGORITHM_PREFIX}{}", hex::encode(Sha256::digest(bytes))))
    }

    /// The rendered `sha256:<hex>` form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest of a single file's contents.
pub fn digest_file(path: &Path) -> Result<Digest> {
    let content = std::fs::read(path).with_file_context(
        FileOperation::Read,
        path,
        "reading file for digest",
    )?;
    Ok(Digest::of_bytes(&content))
}

/// Digest of every regular file under `dir`.
///
/// `exclude` holds `/`-separated paths relative to `dir`; a matching file, or
/// every file beneath a matching directory, is left out. Symbolic links are
/// not followed.
pub fn digest_directory(dir: &Path, exclude: &[String]) -> Result<Digest> {
    let mut lines = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from).with_file_context(
            FileOperation::Walk,
            dir,
            "walking directory for digest",
        )?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = relative_slash_path(dir, entry.path()) else {
            continue;
        };
        if exclude.iter().any(|excluded| is_within(&relative, excluded)) {
            continue;
        }

        let digest = digest_file(entry.path())?;
        lines.push(format!("{relative}:{digest}\n"));
    }

    lines.sort();
    Ok(Digest::of_bytes(lines.concat().as_bytes()))
}

/// Digest of an ordered list of workspace-relative files.
pub fn digest_files(root: &Path, files: &[String]) -> Result<Digest> {
    let mut hasher = Sha256::new();
    for file in files {
        let digest = digest_file(&workspace_path(root, file))?;
        hasher.update(format!("{file}:{digest}\n").as_bytes());
    }
    Ok(Digest(format!("{ALGORITHM_PREFIX}{}", hex::encode(hasher.finalize()))))
}
