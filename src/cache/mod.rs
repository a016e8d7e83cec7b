//! Digest-based caching of module downloads.
//!
//! The cache manifest (`vendor/manifest.toml`) is a snapshot of the manifest
//! taken at the end of the last successful run, with every module's content
//! digest and patch digest filled in. On the next run, a `Download` action is
//! dropped only when the cache can prove the module directory already holds
//! exactly what the download would produce:
//!
//! 1. the cached version equals the requested version,
//! 2. the module directory, minus generated BUILD files and any declared
//!    module nested inside it, hashes to the cached digest, and
//! 3. if either the current or the cached module has patches, the patch files
//!    hash to the cached patch digest and the patch arguments are identical.
//!
//! Anything that goes wrong while checking (no cache manifest, a corrupt one,
//! a missing directory, an unreadable file) keeps the download. Caching is an
//! optimization; it must never be the reason the tree ends up wrong.


use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::actions::Action;
use crate::constants::{BUILD_FILE, cache_manifest_path, vendor_path};
use crate::manifest::{Deps, GoModule};
use crate::utils::checksum::{Digest, digest_directory, digest_files};
use crate::utils::fs::workspace_path;

/// Drop the downloads the cache manifest in `root` proves unnecessary.
///
/// Without a usable cache manifest the actions are returned unchanged.
#[must_use]
pub fn strip_cached_actions(root: &Path, actions: Vec<Action>) -> Vec<Action> {
    let manifest = workspace_path(root, &cache_manifest_path());
    match Deps::load_cached(&manifest) {
        Some(cached) => strip_cached_actions_with(root, actions, &cached),
        None => actions,
    }
}

/// Drop the downloads that `cached` proves unnecessary.
#[must_use]
pub fn strip_cached_actions_with(root: &Path, actions: Vec<Action>, cached: &Deps) -> Vec<Action> {
    if cached.is_empty() {
        return actions;
    }

    let modules: HashMap<&str, &GoModule> =
        cached.modules.iter().map(|module| (module.name.as_str(), module)).collect();

    actions
        .into_iter()
        .filter(|action| match action {
            Action::Download {
                module,
                path,
                nested,
            } => !is_cached(root, module, path, nested, modules.get(module.name.as_str()).copied()),
            _ => true,
        })
        .collect()
}

fn is_cached(
    root: &Path,
    module: &GoModule,
    path: &str,
    nested: &[String],
    cached: Option<&GoModule>,
) -> bool {
    let Some(cached) = cached else {
        debug!("{} is not in the cache", module.name);
        return false;
    };

    if cached.version != module.version {
        debug!(
            "{} is cached at {}, want {}",
            module.name, cached.version, module.version
        );
        return false;
    }

    let exclude = digest_exclusions(module, nested);
    let digest = match digest_directory(&workspace_path(root, path), &exclude) {
        Ok(digest) => digest,
        Err(e) => {
            debug!("cannot digest {path}: {e:#}");
            return false;
        }
    };
    if cached.digest.as_ref() != Some(&digest) {
        debug!("{} has been modified since it was vendored", module.name);
        return false;
    }

    if module.has_patches() || cached.has_patches() {
        let patch_digest = match digest_files(root, &module.patches) {
            Ok(digest) => digest,
            Err(e) => {
                debug!("cannot digest patches for {}: {e:#}", module.name);
                return false;
            }
        };
        if module.patch_args != cached.patch_args || cached.patch_digest.as_ref() != Some(&patch_digest)
        {
            debug!("patches for {} have changed", module.name);
            return false;
        }
    }

    debug!("{}@{} is up to date", module.name, module.version);
    true
}

/// Build the cache manifest payload for `deps` as vendored under `root`.
///
/// Unlike the filter, this fails loudly: it runs as the last step of a plan,
/// after every module has been put in place, so a module that cannot be
/// digested means the run went wrong.
pub fn generate_cache_manifest(root: &Path, deps: &Deps) -> Result<Deps> {
    let mut manifest = deps.clone();
    for module in &mut manifest.modules {
        let nested = deps.nested_modules(&module.name);
        module.digest = Some(module_digest(root, module, &nested)?);
        module.patch_digest = if module.has_patches() {
            let digest = digest_files(root, &module.patches)
                .with_context(|| format!("failed to cache Go module {}'s patches", module.name))?;
            Some(digest)
        } else {
            None
        };
    }
    Ok(manifest)
}

/// Content digest of a vendored module.
///
/// Generated BUILD files and the `nested` module directories (relative to
/// the module) are excluded; those belong to other modules.
pub fn module_digest(root: &Path, module: &GoModule, nested: &[String]) -> Result<Digest> {
    let dir = workspace_path(root, &vendor_path(&module.name));
    digest_directory(&dir, &digest_exclusions(module, nested))
        .with_context(|| format!("failed to cache Go module {}", module.name))
}

fn digest_exclusions(module: &GoModule, nested: &[String]) -> Vec<String> {
    let mut exclude = build_file_exclusions(module);
    exclude.extend(nested.iter().cloned());
    exclude
}

/// BUILD files VDM writes into a module, relative to the module directory.
#[must_use]
pub fn build_file_exclusions(module: &GoModule) -> Vec<String> {
    let packages = module.packages.iter().map(|package| package.name.as_str());
    let directories = module.directories.iter().map(|directory| directory.name.as_str());

    packages
        .chain(directories)
        .map(|name| match name.strip_prefix(&module.name).and_then(|rest| rest.strip_prefix('/')) {
            Some(relative) => format!("{relative}/{BUILD_FILE}"),
            None => BUILD_FILE.to_string(),
        })
        .collect()
}
