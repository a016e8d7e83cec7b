//! Dependency manifest parsing and the vendoring data model.
//!
//! The manifest (`deps.toml` at the workspace root) declares every Go module
//! to vendor, pinned to an exact version, along with the packages inside each
//! module that the workspace uses. The same schema doubles as the cache
//! manifest (`vendor/manifest.toml`), where every module additionally carries
//! its content digest and, when patched, its patch digest.
//!
//! # Manifest Format
//!
//! ```toml
//! [[module]]
//! name = "rsc.io/quote"
//! version = "v1.5.2"
//! patches = ["patches/rsc.io_quote.patch"]
//! patch_args = ["-p1"]
//!
//! [[module.package]]
//! name = "rsc.io/quote"
//! deps = ["rsc.io/sampler"]
//! test_deps = ["rsc.io/testonly"]
//!
//! [[module.package]]
//! name = "rsc.io/quote/cmd/quote"
//! binary = true
//! no_tests = true
//!
//! [[module.directory]]
//! name = "rsc.io/quote/testdata"
//! exports_files = ["golden.txt"]
//! ```
//!
//! # Field Semantics
//!
//! The mapping is explicit: every struct denies unknown fields, required fields
//! have no `#[serde(default)]`, and optional fields default to empty. Fields
//! that only matter at execution time (the list of source files in a package,
//! the naming convention for generated rules) are not part of the schema.
//!
//! Module order is input order. It is not significant for correctness but is
//! preserved so that plans and cache manifests are deterministic.

mod manifest_io;
mod manifest_validation;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::checksum::Digest;

/// A set of software dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Deps {
    /// Declared Go modules, in manifest order.
    #[serde(rename = "module", default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<GoModule>,
}

/// A Go module to vendor, with the set of packages within it that are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoModule {
    /// Module path, e.g. `golang.org/x/crypto`.
    pub name: String,
    /// Exact version, e.g. `v0.17.0`.
    pub version: String,

    /// Arguments passed to the patch tool for every patch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patch_args: Vec<String>,
    /// Workspace-relative patch files, applied in order after download.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<String>,

    /// Packages within the module that should be built.
    #[serde(rename = "package", default)]
    pub packages: Vec<GoPackage>,

    /// Directories of plain files to export.
    #[serde(rename = "directory", default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<TextFiles>,

    /// Content digest of the vendored module; cache manifest only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<Digest>,
    /// Digest of the patch files; cache manifest only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_digest: Option<Digest>,
}

/// A package within a Go module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoPackage {
    /// Import path; equal to or nested under the module path.
    pub name: String,

    /// Manually-managed BUILD file, copied verbatim instead of generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_file: Option<String>,

    /// Build dependencies, as package import paths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
    /// Files embedded with `//go:embed`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embed: Vec<String>,
    /// Glob patterns of files embedded with `//go:embed`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embed_globs: Vec<String>,

    /// Whether the package is a `main` package.
    #[serde(default, skip_serializing_if = "is_false")]
    pub binary: bool,
    /// Extra dependencies of the binary target only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binary_deps: Vec<String>,

    /// Skip generating a test target.
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_tests: bool,
    /// Bazel test size; `small` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_size: Option<String>,
    /// Data files needed by the tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_data: Vec<String>,
    /// Glob patterns of data files needed by the tests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_data_globs: Vec<String>,
    /// Test-only dependencies, as package import paths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_deps: Vec<String>,
    /// Environment variables for the tests.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub test_env: BTreeMap<String, String>,
}

/// A directory of plain files exported verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextFiles {
    /// Directory path, nested under the module path.
    pub name: String,
    /// Files to export publicly.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports_files: Vec<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl Deps {
    /// Whether any module is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Look up a module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&GoModule> {
        self.modules.iter().find(|module| module.name == name)
    }

    /// Iterate over every declared package, in manifest order.
    pub fn packages(&self) -> impl Iterator<Item = &GoPackage> {
        self.modules.iter().flat_map(|module| module.packages.iter())
    }

    /// Declared modules that live inside `name`'s directory, relative to it.
    ///
    /// `rsc.io/quote/v3` is nested in `rsc.io/quote` as `v3`.
    #[must_use]
    pub fn nested_modules(&self, name: &str) -> Vec<String> {
        let mut nested: Vec<String> = self
            .modules
            .iter()
            .filter_map(|module| module.name.strip_prefix(name)?.strip_prefix('/'))
            .map(str::to_string)
            .collect();
        nested.sort();
        nested
    }

    /// Total number of declared packages.
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.modules.iter().map(|module| module.packages.len()).sum()
    }
}

impl GoModule {
    /// Whether the module declares any patches.
    #[must_use]
    pub fn has_patches(&self) -> bool {
        !self.patches.is_empty()
    }
}

/// Whether `path` is `root` or lies beneath it on a `/` boundary.
///
/// `rsc.io/quote/v3` is within `rsc.io/quote`, but `rsc.io/quotes` is not.
#[must_use]
pub fn is_within(path: &str, root: &str) -> bool {
    path == root || is_strict_descendant(path, root)
}

/// Whether `path` lies strictly beneath `ancestor` on a `/` boundary.
#[must_use]
pub fn is_strict_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
