//! Minimal removal of stale directories under the vendor root.
//!
//! Module paths are multi-segment (`golang.org/x/crypto`), so a directory
//! under `vendor/` can be a module, a strict ancestor of one or more modules,
//! or stale. Only stale directories are removed, and only the topmost one of
//! any stale subtree, so the removal set never holds both a path and its
//! ancestor.

use anyhow::Result;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use walkdir::WalkDir;

use crate::core::file_error::{FileOperation, FileResultExt};
use crate::manifest::is_strict_descendant;
use crate::utils::fs::relative_slash_path;

/// Directories under `vendor` to remove, relative to `vendor`, sorted.
///
/// `modules` are the declared module paths. Module directories are not
/// descended into; whatever they hold is left for the cache to judge.
pub fn stale_directories(vendor: &Path, modules: &[&str]) -> Result<Vec<String>> {
    let wanted: HashSet<&str> = modules.iter().copied().collect();
    let mut candidates = BTreeSet::new();

    let mut walker = WalkDir::new(vendor).min_depth(1).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(std::io::Error::from).with_file_context(
            FileOperation::Walk,
            vendor,
            "finding stale vendored directories",
        )?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(relative) = relative_slash_path(vendor, entry.path()) else {
            continue;
        };
        if wanted.contains(relative.as_str()) {
            walker.skip_current_dir();
            continue;
        }
        candidates.insert(relative);
    }

    // Directories that a module will live beneath must stay.
    candidates.retain(|candidate: &String| {
        !modules.iter().any(|module| is_strict_descendant(module, candidate))
    });

    Ok(candidates
        .iter()
        .filter(|candidate| match candidate.rsplit_once('/') {
            Some((parent, _)) => !candidates.contains(parent),
            None => true,
        })
        .cloned()
        .collect())
}
