//! File system helpers shared by the planner and the actions.
//!
//! Paths handed to actions are workspace-relative and `/`-separated;
//! everything here takes the absolute path the action resolved.

use crate::core::file_error::{FileOperation, FileResultExt};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Create a directory and all of its parents.
///
/// Succeeds if the directory already exists; fails if something other than a
/// directory is in the way.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_file_context(
            FileOperation::CreateDir,
            path,
            "creating directory",
        )?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// The content goes to a sibling `.tmp` file which is synced and then renamed
/// over the target, so readers see either the old or the new file, never a
/// partial one. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path).with_file_context(
            FileOperation::Write,
            &temp_path,
            "creating temporary file",
        )?;
        file.write_all(content)
            .with_file_context(FileOperation::Write, &temp_path, "writing temporary file")?;
        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Remove a file or a whole directory tree.
///
/// A path that does not exist is already in the target state.
pub fn remove_all(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e)
                .with_file_context(FileOperation::Metadata, path, "checking path to remove")
                .map_err(Into::into);
        }
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path).with_file_context(
            FileOperation::Remove,
            path,
            "removing directory tree",
        )?;
    } else {
        fs::remove_file(path).with_file_context(FileOperation::Remove, path, "removing file")?;
    }
    Ok(())
}

/// Clear the read-only bit on an existing file so it can be overwritten.
///
/// Module archives extract read-only on some platforms, and copied BUILD
/// files keep the permissions of their source.
pub fn make_writable(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e)
                .with_file_context(FileOperation::Metadata, path, "checking permissions")
                .map_err(Into::into);
        }
    };

    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions).with_file_context(
            FileOperation::Permissions,
            path,
            "making file writable",
        )?;
    }
    Ok(())
}

/// Render `path` relative to `base` with `/` separators.
///
/// Returns `None` when `path` is not under `base`.
#[must_use]
pub fn relative_slash_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Join a workspace-relative `/` path onto the workspace root.
#[must_use]
pub fn workspace_path(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// Whether a relative path stays beneath its base once `..` is resolved.
///
/// Used to reject archive entries and patch paths that would escape.
#[must_use]
pub fn is_contained(relative: &Path) -> bool {
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}
