//! Well-known names and defaults used throughout the VDM codebase.
//!
//! Every path here is relative to the workspace root and uses `/` as the
//! separator, matching how paths are stored in actions and manifests.

/// The dependency manifest, read on every invocation.
pub const DEPS_FILE: &str = "deps.toml";

/// The vendor root holding one directory per vendored module.
pub const VENDOR_DIR: &str = "vendor";

/// File name of the cache manifest inside [`VENDOR_DIR`].
pub const CACHE_MANIFEST: &str = "manifest.toml";

/// File name of every generated or copied build-metadata file.
pub const BUILD_FILE: &str = "BUILD.bazel";

/// Identifies VDM to the module proxy and the advisory database.
pub const USER_AGENT: &str = concat!(
    "Vendoring-Dependency-Manager/",
    env!("CARGO_PKG_VERSION"),
    " (github.com/ProjectSerenity/vdm)"
);

/// Default Go module proxy.
pub const DEFAULT_PROXY_URL: &str = "https://proxy.golang.org";

/// Default OSV advisory database API.
pub const DEFAULT_OSV_URL: &str = "https://api.osv.dev";

/// Ecosystem name used for advisory queries.
pub const OSV_ECOSYSTEM: &str = "Go";

/// Maximum number of queries the OSV batch endpoint accepts per request.
pub const OSV_BATCH_LIMIT: usize = 1000;

/// Patch arguments used when a module declares patches but no `patch_args`.
pub const DEFAULT_PATCH_ARGS: &[&str] = &["-p1"];

/// Header written at the top of the cache manifest.
pub const CACHE_MANIFEST_HEADER: &str =
    "# Code generated by vdm. DO NOT EDIT.\n# This file caches the state of the vendor directory.\n\n";

/// The vendor path for a module or package name, e.g. `vendor/rsc.io/quote`.
#[must_use]
pub fn vendor_path(name: &str) -> String {
    format!("{VENDOR_DIR}/{name}")
}

/// The workspace-relative path of the cache manifest.
#[must_use]
pub fn cache_manifest_path() -> String {
    format!("{VENDOR_DIR}/{CACHE_MANIFEST}")
}
