//! Runtime configuration for VDM
//!
//! VDM has no configuration file of its own: everything comes from global
//! command-line flags, each of which can also be set through the environment.
//!
//! | Flag | Environment | Default |
//! |---|---|---|
//! | `--workspace` | `VDM_WORKSPACE` | `BUILD_WORKSPACE_DIRECTORY`, else the current directory |
//! | `--proxy` | `VDM_PROXY` | `https://proxy.golang.org` |
//! | `--osv-url` | `VDM_OSV_URL` | `https://api.osv.dev` |
//!
//! `BUILD_WORKSPACE_DIRECTORY` is set by `bazel run`, so `bazel run //:vdm --
//! vendor` operates on the workspace rather than the runfiles tree.
//!
//! The resolved [`Config`] is passed explicitly to whatever needs it; nothing
//! reads the environment after startup and the process never changes
//! directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{DEFAULT_OSV_URL, DEFAULT_PROXY_URL, DEPS_FILE, USER_AGENT, cache_manifest_path};
use crate::utils::fs::workspace_path;

/// Environment variable `bazel run` sets to the invoking workspace.
pub const BAZEL_WORKSPACE_ENV: &str = "BUILD_WORKSPACE_DIRECTORY";

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Workspace root; every path VDM touches is relative to it
    pub workspace: PathBuf,
    /// User agent for every outbound HTTP request
    pub user_agent: String,
    /// Go module proxy base URL
    pub proxy_url: String,
    /// OSV API base URL
    pub osv_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            user_agent: USER_AGENT.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            osv_url: DEFAULT_OSV_URL.to_string(),
        }
    }
}

impl Config {
    /// Resolve the configuration from explicit overrides, falling back to the
    /// environment and the current directory.
    ///
    /// The workspace is made absolute, since external tools run with other
    /// working directories.
    pub fn resolve(
        workspace: Option<PathBuf>,
        proxy_url: Option<String>,
        osv_url: Option<String>,
    ) -> Result<Self> {
        let bazel_workspace = std::env::var_os(BAZEL_WORKSPACE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let workspace = match workspace.or(bazel_workspace) {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let workspace = std::path::absolute(&workspace)
            .with_context(|| format!("Failed to resolve workspace {}", workspace.display()))?;
        debug!("workspace root: {}", workspace.display());

        let defaults = Self::default();
        Ok(Self {
            workspace,
            proxy_url: proxy_url.unwrap_or(defaults.proxy_url),
            osv_url: osv_url.unwrap_or(defaults.osv_url),
            user_agent: defaults.user_agent,
        })
    }

    /// A configuration rooted at `workspace` with default endpoints.
    pub fn for_workspace(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            ..Self::default()
        }
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.workspace
    }

    /// Path of the dependency manifest.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.workspace.join(DEPS_FILE)
    }

    /// Path of the cache manifest.
    #[must_use]
    pub fn cache_manifest_path(&self) -> PathBuf {
        workspace_path(&self.workspace, &cache_manifest_path())
    }
}
