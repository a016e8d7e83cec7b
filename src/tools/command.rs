//! Builder for running external tools (`patch`, `bazel`) with consistent
//! logging, timeouts and output capture.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::VdmError;

/// Fluent builder for one invocation of an external tool.
///
/// ```rust,ignore
/// use vdm::tools::ToolCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let output = ToolCommand::new("patch")?
///     .args(["-p1", "-i", "/workspace/patches/quote.patch"])
///     .current_dir("/workspace/vendor/rsc.io/quote")
///     .execute()
///     .await?;
/// assert!(output.success);
/// # Ok(())
/// # }
/// ```
pub struct ToolCommand {
    /// Resolved path of the executable
    program: PathBuf,

    /// Display name for logs and errors
    name: String,

    /// Command arguments
    args: Vec<String>,

    /// Working directory (defaults to the current process directory)
    current_dir: Option<PathBuf>,

    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,
}

/// Captured result of a finished tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Whether the tool exited with status zero
    pub success: bool,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl ToolCommand {
    /// Locate `name` on `PATH` and start building a command for it.
    ///
    /// # Errors
    ///
    /// Returns [`VdmError::ToolNotFound`] if the executable cannot be found.
    pub fn new(name: &str) -> Result<Self> {
        let program = which::which(name).map_err(|_| VdmError::ToolNotFound {
            tool: name.to_string(),
        })?;
        Ok(Self::with_program(name, program))
    }

    /// Build a command for an executable that has already been located.
    pub fn with_program(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            name: name.into(),
            args: Vec::new(),
            current_dir: None,
            timeout_duration: Some(Duration::from_secs(600)),
        }
    }

    /// Add one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the tool inside `dir`.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Override the default ten-minute timeout.
    pub const fn timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// The command line, for logs and error messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the tool to completion and capture its output.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`ToolOutput::success`] and choose the error to report.
    pub async fn execute(self) -> Result<ToolOutput> {
        let start = std::time::Instant::now();
        let command_line = self.command_line();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
            tracing::debug!(target: "vdm::tools", "Executing in {}: {}", dir.display(), command_line);
        } else {
            tracing::debug!(target: "vdm::tools", "Executing: {}", command_line);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result.with_context(|| format!("Failed to execute {command_line}"))?,
                Err(_) => {
                    tracing::warn!(
                        target: "vdm::tools",
                        "Command timed out after {} seconds: {}",
                        duration.as_secs(),
                        command_line
                    );
                    return Err(VdmError::QueryFailed {
                        command: command_line,
                        stderr: format!("timed out after {} seconds", duration.as_secs()),
                    }
                    .into());
                }
            }
        } else {
            output_future.await.with_context(|| format!("Failed to execute {command_line}"))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "vdm::tools",
                "{} failed with exit code {:?}",
                self.name,
                output.status.code()
            );
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "vdm::tools", "{}", stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "vdm::tools::perf",
                "{} took {:.2}s",
                self.name,
                elapsed.as_secs_f64()
            );
        }

        Ok(ToolOutput {
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}
