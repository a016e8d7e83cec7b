//! `bazel query` as the reachability oracle.

use anyhow::Result;
use std::path::PathBuf;

use super::ReachabilityOracle;
use crate::constants::VENDOR_DIR;
use crate::core::VdmError;
use crate::tools::ToolCommand;

/// Runs `bazel query` in the workspace root.
#[derive(Debug, Clone)]
pub struct BazelQuery {
    workspace: PathBuf,
}

impl BazelQuery {
    /// Query the Bazel workspace rooted at `workspace`.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    /// The query expression for `roots`.
    #[must_use]
    pub fn expression(roots: &[String]) -> String {
        let deps: Vec<String> = roots.iter().map(|root| format!("deps({root})")).collect();
        format!("({}) intersect //{VENDOR_DIR}/...", deps.join(" union "))
    }
}

impl ReachabilityOracle for BazelQuery {
    async fn reachable_packages(&self, roots: &[String]) -> Result<Vec<String>> {
        let command = ToolCommand::new("bazel")?
            .args([
                "query",
                "--noshow_progress",
                "--noshow_loading_progress",
                "--ui_event_filters=-info",
            ])
            .arg(Self::expression(roots))
            .arg("--output=package")
            .current_dir(&self.workspace);
        let command_line = command.command_line();

        let output = command.execute().await?;
        if !output.success {
            return Err(VdmError::QueryFailed {
                command: command_line,
                stderr: output.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(parse_packages(&output.stdout))
    }
}

/// Turn `--output=package` lines into Go package names.
pub(super) fn parse_packages(stdout: &str) -> Vec<String> {
    let prefix = format!("{VENDOR_DIR}/");
    stdout
        .split_whitespace()
        .map(|line| line.trim_start_matches("//"))
        .filter_map(|line| line.strip_prefix(&prefix))
        .map(ToString::to_string)
        .collect()
}
