//! Module download: fetch, unpack, patch.

use anyhow::{Context, Result, bail};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use super::ExecutionContext;
use crate::constants::DEFAULT_PATCH_ARGS;
use crate::core::VdmError;
use crate::core::file_error::{FileOperation, FileResultExt};
use crate::manifest::{GoModule, is_strict_descendant, is_within};
use crate::proxy::ModuleSource;
use crate::tools::ToolCommand;
use crate::utils::fs::{ensure_dir, is_contained, remove_all, workspace_path};

pub(super) async fn download_module<S: ModuleSource>(
    ctx: &ExecutionContext<'_, S>,
    module: &GoModule,
    path: &str,
    nested: &[String],
) -> Result<()> {
    let target = workspace_path(ctx.root, path);
    clear_module_dir(&target, nested)?;

    let archive = ctx.source.fetch(&module.name, &module.version).await?;
    let prefix = format!("{}@{}/", module.name, module.version);
    let extracted = extract_module_zip(&archive, &prefix, &target, nested).map_err(|e| {
        VdmError::FetchError {
            module: module.name.clone(),
            version: module.version.clone(),
            reason: format!("{e:#}"),
        }
    })?;
    ensure_dir(&target)?;
    info!("extracted {extracted} files from {}@{}", module.name, module.version);

    if module.has_patches() {
        apply_patches(ctx.root, module, &target).await?;
    }
    Ok(())
}

/// Empty `dir` ahead of an extraction, keeping the `keep` subtrees.
///
/// `keep` lists the directories of other declared modules nested inside this
/// one, relative to `dir`. They are vendored by their own download.
fn clear_module_dir(dir: &Path, keep: &[String]) -> Result<()> {
    if keep.is_empty() || !dir.is_dir() {
        return remove_all(dir);
    }
    clear_except(dir, "", keep)
}

fn clear_except(dir: &Path, relative: &str, keep: &[String]) -> Result<()> {
    let entries = std::fs::read_dir(dir).with_file_context(
        FileOperation::ReadDir,
        dir,
        "clearing module directory",
    )?;

    for entry in entries {
        let entry =
            entry.with_file_context(FileOperation::ReadDir, dir, "clearing module directory")?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let child = if relative.is_empty() {
            name
        } else {
            format!("{relative}/{name}")
        };

        if keep.contains(&child) {
            debug!("keeping nested module directory {child}");
            continue;
        }
        let path = entry.path();
        let holds_nested = keep.iter().any(|kept| is_strict_descendant(kept, &child));
        if holds_nested && path.is_dir() {
            clear_except(&path, &child, keep)?;
        } else {
            remove_all(&path)?;
        }
    }
    Ok(())
}

/// Unpack a Go module zip into `target`.
///
/// Every entry must start with `prefix` (`<module>@<version>/`), which is
/// stripped; entries outside the prefix or escaping `target` are rejected.
/// Entries under a `skip` directory (relative to `target`) are ignored.
/// Returns the number of files written.
pub fn extract_module_zip(
    archive: &[u8],
    prefix: &str,
    target: &Path,
    skip: &[String],
) -> Result<usize> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).context("invalid module archive")?;
    let mut written = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).context("invalid module archive entry")?;
        let name = entry.name().to_string();
        let Some(relative) = name.strip_prefix(prefix) else {
            bail!("archive entry {name:?} is outside {prefix:?}");
        };
        if relative.is_empty() {
            continue;
        }
        let trimmed = relative.trim_end_matches('/');
        if skip.iter().any(|skipped| is_within(trimmed, skipped)) {
            continue;
        }

        let relative = Path::new(relative);
        if !is_contained(relative) {
            bail!("archive entry {name:?} escapes the module directory");
        }

        let out_path = target.join(relative);
        if entry.is_dir() {
            ensure_dir(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            ensure_dir(parent)?;
        }
        let mut out = std::fs::File::create(&out_path).with_file_context(
            FileOperation::Write,
            &out_path,
            "extracting module file",
        )?;
        std::io::copy(&mut entry, &mut out).with_file_context(
            FileOperation::Write,
            &out_path,
            "extracting module file",
        )?;
        written += 1;
    }

    Ok(written)
}

async fn apply_patches(root: &Path, module: &GoModule, target: &Path) -> Result<()> {
    let program = which::which("patch").map_err(|_| VdmError::PatchToolNotFound)?;

    let args: Vec<String> = if module.patch_args.is_empty() {
        DEFAULT_PATCH_ARGS.iter().map(ToString::to_string).collect()
    } else {
        module.patch_args.clone()
    };

    for patch in &module.patches {
        // `patch` runs inside the module directory.
        let patch_path = std::path::absolute(workspace_path(root, patch))
            .with_file_context(FileOperation::Metadata, root, "resolving patch path")?;
        debug!("applying {patch} to {}", module.name);

        let output = ToolCommand::with_program("patch", &program)
            .args(args.iter().cloned())
            .arg("-i")
            .arg(patch_path.display().to_string())
            .current_dir(target)
            .execute()
            .await?;

        if !output.success {
            return Err(VdmError::PatchFailed {
                module: module.name.clone(),
                patch: patch.clone(),
                stderr: format!("{}{}", output.stdout, output.stderr).trim().to_string(),
            }
            .into());
        }
    }
    Ok(())
}
