//! Turns the manifest and the current vendor tree into an ordered plan.
//!
//! The planner only reads the filesystem. It assumes the vendor tree is dirty
//! and plans as if every module must be replaced; the cache layer later drops
//! the downloads it can prove redundant. The resulting plan has a fixed shape:
//!
//! 1. removal of loose files directly inside `vendor/` (never the cache manifest)
//! 2. removal of stale directories, minimal and sorted (see [`stale`])
//! 3. per module, in manifest order: a download, then one BUILD action per
//!    package (a copy when the manifest names an override, otherwise a
//!    generation), then one per plain-file directory
//! 4. the cache manifest write
//!
//! All removals precede all creations and the cache manifest is always last,
//! so running the plan from any starting state converges on the declared one.

pub mod stale;

#[cfg(test)]
mod tests;

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use strsim::levenshtein;
use tracing::debug;

use crate::actions::Action;
use crate::constants::{BUILD_FILE, CACHE_MANIFEST, VENDOR_DIR, cache_manifest_path, vendor_path};
use crate::core::file_error::{FileOperation, FileResultExt};
use crate::core::{DependencyKind, MissingDependency, VdmError};
use crate::manifest::Deps;
use crate::templating::NamingConvention;
use crate::utils::fs::workspace_path;

/// Maximum edit distance, as a percentage of the name's length, for a
/// "did you mean" suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 25;

/// Plan the actions that bring `root`'s vendor tree in line with `deps`.
///
/// # Errors
///
/// - [`VdmError::IncompleteDependencyGraph`] listing every unresolved
///   dependency, before anything else is looked at
/// - [`VdmError::VendorNotDirectory`] if `vendor` exists but is not a directory
/// - a file error if the vendor tree cannot be read
pub fn plan(root: &Path, deps: &Deps, naming: NamingConvention) -> Result<Vec<Action>> {
    check_dependency_graph(deps)?;

    if deps.is_empty() {
        return Ok(vec![Action::RemoveAll {
            path: VENDOR_DIR.to_string(),
        }]);
    }

    let vendor = workspace_path(root, VENDOR_DIR);
    let mut actions = Vec::new();

    if vendor_exists(&vendor)? {
        for name in loose_files(&vendor)? {
            actions.push(Action::RemoveAll {
                path: vendor_path(&name),
            });
        }

        let modules: Vec<&str> = deps.modules.iter().map(|module| module.name.as_str()).collect();
        for dir in stale::stale_directories(&vendor, &modules)? {
            actions.push(Action::RemoveAll {
                path: vendor_path(&dir),
            });
        }
    }
    debug!("{} stale paths to remove", actions.len());

    for module in &deps.modules {
        actions.push(Action::Download {
            module: module.clone(),
            path: vendor_path(&module.name),
            nested: deps.nested_modules(&module.name),
        });

        for package in &module.packages {
            let path = format!("{}/{BUILD_FILE}", vendor_path(&package.name));
            actions.push(match &package.build_file {
                Some(source) => Action::CopyBuildFile {
                    source: source.clone(),
                    path,
                },
                None => Action::GeneratePackageBuild {
                    package: package.clone(),
                    path,
                    naming,
                },
            });
        }

        for directory in &module.directories {
            actions.push(Action::GenerateDirectoryBuild {
                directory: directory.clone(),
                path: format!("{}/{BUILD_FILE}", vendor_path(&directory.name)),
            });
        }
    }

    actions.push(Action::WriteCacheManifest {
        deps: deps.clone(),
        path: cache_manifest_path(),
    });

    Ok(actions)
}

/// Check that every dependency reference names a declared package.
///
/// Build dependencies (including binary-only ones) and test dependencies are
/// all checked, and every violation is reported, in manifest order.
pub fn check_dependency_graph(deps: &Deps) -> Result<()> {
    let declared: HashSet<&str> = deps.packages().map(|package| package.name.as_str()).collect();
    let mut missing = Vec::new();

    for package in deps.packages() {
        let build = package
            .deps
            .iter()
            .chain(&package.binary_deps)
            .map(|dep| (dep, DependencyKind::Build));
        let test = package.test_deps.iter().map(|dep| (dep, DependencyKind::Test));

        for (dependency, kind) in build.chain(test) {
            if !declared.contains(dependency.as_str()) {
                missing.push(MissingDependency {
                    package: package.name.clone(),
                    dependency: dependency.clone(),
                    kind,
                    suggestion: closest_package(dependency, deps),
                });
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VdmError::IncompleteDependencyGraph {
            missing,
        }
        .into())
    }
}

fn closest_package(target: &str, deps: &Deps) -> Option<String> {
    deps.packages()
        .map(|package| (package.name.as_str(), levenshtein(target, &package.name)))
        .filter(|(_, distance)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name.to_string())
}

fn vendor_exists(vendor: &Path) -> Result<bool> {
    match std::fs::symlink_metadata(vendor) {
        Ok(metadata) if metadata.is_dir() => Ok(true),
        Ok(_) => Err(VdmError::VendorNotDirectory {
            path: VENDOR_DIR.to_string(),
        }
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e)
            .with_file_context(FileOperation::Metadata, vendor, "checking vendor directory")
            .map_err(Into::into),
    }
}

/// Names of the non-directory entries directly inside `vendor`, sorted,
/// skipping the cache manifest.
fn loose_files(vendor: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(vendor).with_file_context(
        FileOperation::ReadDir,
        vendor,
        "listing vendor directory",
    )?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.with_file_context(FileOperation::ReadDir, vendor, "listing vendor directory")?;
        let file_type = entry.file_type().with_file_context(
            FileOperation::Metadata,
            entry.path(),
            "listing vendor directory",
        )?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !file_type.is_dir() && name != CACHE_MANIFEST {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
