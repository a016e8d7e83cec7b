//! The closed set of filesystem operations a plan is made of.
//!
//! Every [`Action`] is idempotent: applying it to a tree that is already in the
//! target state is either a no-op or a byte-identical overwrite. Paths inside
//! actions are workspace-relative and `/`-separated; [`Action::execute`]
//! resolves them against [`ExecutionContext::root`].
//!
//! `Display` gives the one-line description printed by `vdm vendor --dry-run`.

mod download;


use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::cache;
use crate::core::file_error::{FileOperation, FileResultExt};
use crate::manifest::{Deps, GoModule, GoPackage, TextFiles};
use crate::proxy::ModuleSource;
use crate::templating::{BuildFileRenderer, NamingConvention, PackageFiles};
use crate::utils::fs::{atomic_write, ensure_dir, make_writable, remove_all, workspace_path};

pub use download::extract_module_zip;

/// One step of a vendoring plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Delete a file or directory tree.
    RemoveAll {
        /// Path to remove
        path: String,
    },

    /// Replace a module directory with a fresh, patched copy of the module.
    Download {
        /// The module to fetch
        module: GoModule,
        /// Directory the module is extracted into
        path: String,
        /// Declared modules inside `path`, relative to it; left in place
        nested: Vec<String>,
    },

    /// Copy a manually-managed BUILD file into a package.
    CopyBuildFile {
        /// Override file named in the manifest
        source: String,
        /// Destination BUILD file
        path: String,
    },

    /// Generate a Go package's BUILD file.
    GeneratePackageBuild {
        /// The package, as declared
        package: GoPackage,
        /// Destination BUILD file
        path: String,
        /// Repository names used in `load` statements
        naming: NamingConvention,
    },

    /// Generate a plain-file directory's BUILD file.
    GenerateDirectoryBuild {
        /// The directory, as declared
        directory: TextFiles,
        /// Destination BUILD file
        path: String,
    },

    /// Digest the vendored modules and write the cache manifest.
    WriteCacheManifest {
        /// The full declared dependency set
        deps: Deps,
        /// Destination of the cache manifest
        path: String,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoveAll {
                path,
            } => write!(f, "remove {path}"),
            Self::Download {
                module,
                path,
                ..
            } => write!(f, "download Go module {}@{} to {path}", module.name, module.version),
            Self::CopyBuildFile {
                source,
                path,
            } => write!(f, "copy BUILD file from {source} to {path}"),
            Self::GeneratePackageBuild {
                package,
                path,
                ..
            } => write!(f, "generate BUILD file for Go package {} to {path}", package.name),
            Self::GenerateDirectoryBuild {
                directory,
                path,
            } => write!(f, "generate BUILD file for text files {} to {path}", directory.name),
            Self::WriteCacheManifest {
                path,
                ..
            } => write!(f, "generate cache manifest to {path}"),
        }
    }
}

/// Everything an action needs from the outside world.
pub struct ExecutionContext<'a, S> {
    /// Workspace root every action path is relative to
    pub root: &'a Path,
    /// Where module archives come from
    pub source: &'a S,
    /// BUILD file templates
    pub renderer: &'a BuildFileRenderer,
}

impl<'a, S: ModuleSource> ExecutionContext<'a, S> {
    /// Bundle the collaborators for a run.
    pub const fn new(root: &'a Path, source: &'a S, renderer: &'a BuildFileRenderer) -> Self {
        Self {
            root,
            source,
            renderer,
        }
    }
}

impl Action {
    /// Whether this is a module download.
    #[must_use]
    pub const fn is_download(&self) -> bool {
        matches!(self, Self::Download { .. })
    }

    /// Apply the action to the workspace.
    ///
    /// Actions assume every earlier action in the plan has already been
    /// applied; a failure leaves the tree partially updated and is recovered
    /// by planning again.
    pub async fn execute<S: ModuleSource>(&self, ctx: &ExecutionContext<'_, S>) -> Result<()> {
        debug!("{self}");
        match self {
            Self::RemoveAll {
                path,
            } => remove_all(&workspace_path(ctx.root, path)),

            Self::Download {
                module,
                path,
                nested,
            } => download::download_module(ctx, module, path, nested).await,

            Self::CopyBuildFile {
                source,
                path,
            } => copy_build_file(ctx.root, source, path),

            Self::GeneratePackageBuild {
                package,
                path,
                naming,
            } => {
                let target = workspace_path(ctx.root, path);
                let dir = target.parent().unwrap_or(ctx.root);
                let files = list_package_files(dir)
                    .with_context(|| format!("failed to list Go files in {}", package.name))?;
                let rendered = ctx.renderer.render_package(package, &files, *naming)?;
                write_build_file(&target, rendered.as_bytes())
            }

            Self::GenerateDirectoryBuild {
                directory,
                path,
            } => {
                let rendered = ctx.renderer.render_directory(directory)?;
                write_build_file(&workspace_path(ctx.root, path), rendered.as_bytes())
            }

            Self::WriteCacheManifest {
                deps,
                path,
            } => {
                let manifest = cache::generate_cache_manifest(ctx.root, deps)
                    .context("failed to build cache manifest")?;
                let content = manifest.to_cache_manifest_string()?;
                atomic_write(&workspace_path(ctx.root, path), content.as_bytes())
            }
        }
    }
}

fn copy_build_file(root: &Path, source: &str, path: &str) -> Result<()> {
    let source_path = workspace_path(root, source);
    let content = std::fs::read(&source_path).with_file_context(
        FileOperation::Read,
        &source_path,
        "reading BUILD file override",
    )?;
    write_build_file(&workspace_path(root, path), &content)
}

/// Write a BUILD file, replacing any read-only copy from the module archive.
fn write_build_file(target: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    make_writable(target)?;
    std::fs::write(target, content).with_file_context(
        FileOperation::Write,
        target,
        "writing BUILD file",
    )?;
    Ok(())
}

/// Find the Go and assembly sources directly inside a package directory.
pub fn list_package_files(dir: &Path) -> Result<PackageFiles> {
    let entries =
        std::fs::read_dir(dir).with_file_context(FileOperation::ReadDir, dir, "listing Go package")?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_file_context(FileOperation::ReadDir, dir, "listing Go package")?;
        let file_type = entry.file_type().with_file_context(
            FileOperation::Metadata,
            entry.path(),
            "listing Go package",
        )?;
        if !file_type.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(PackageFiles::classify(names))
}
