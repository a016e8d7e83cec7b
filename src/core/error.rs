//! Error handling for VDM
//!
//! This module provides the error types and user-facing error reporting for VDM.
//! The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`VdmError`] - Enumerated error types for all fatal failure cases
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//! - [`user_friendly_error`] - Converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Error Policy
//!
//! Anything that could leave the vendor tree inconsistent with the manifest is
//! fatal and surfaces as a [`VdmError`]. Anything that only affects caching
//! efficiency (a missing, corrupt, or mismatched cache manifest) is not an
//! error at all; the cache layer logs it and carries on as if nothing were
//! cached.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vdm::core::{VdmError, user_friendly_error};
//!
//! let error = VdmError::ManifestNotFound {
//!     path: "deps.toml".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for VDM operations.
///
/// Each variant names one failure mode and carries enough context (paths,
/// module names, tool output) to explain it without re-running the command.
#[derive(Error, Debug)]
pub enum VdmError {
    /// The dependency manifest does not exist in the workspace.
    #[error("Dependency manifest not found: {path}")]
    ManifestNotFound {
        /// Path at which the manifest was expected
        path: String,
    },

    /// The manifest could not be parsed.
    #[error("Invalid manifest file syntax in {file}: {reason}")]
    ManifestParseError {
        /// Path to the manifest file that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// The manifest parsed but violates a structural rule.
    #[error("Manifest validation failed: {reason}")]
    ManifestValidationError {
        /// Reason why validation failed
        reason: String,
    },

    /// One or more dependency references do not resolve to a declared package.
    ///
    /// Every violation found is carried, not just the first.
    #[error("missing dependencies:\n{}", format_missing(.missing))]
    IncompleteDependencyGraph {
        /// All unresolved references, in manifest order
        missing: Vec<MissingDependency>,
    },

    /// The vendor root exists but is not a directory.
    #[error("failed to vendor dependencies: {path:?} exists and is not a directory")]
    VendorNotDirectory {
        /// Workspace-relative path of the vendor root
        path: String,
    },

    /// A filesystem operation failed while planning or executing.
    #[error("File system error: {operation} {path}")]
    FileSystemError {
        /// The operation that failed
        operation: String,
        /// Path where the failure occurred
        path: String,
    },

    /// A module archive could not be retrieved or unpacked.
    #[error("Failed to fetch Go module {module}@{version}: {reason}")]
    FetchError {
        /// Module path
        module: String,
        /// Requested version
        version: String,
        /// Underlying reason
        reason: String,
    },

    /// The `patch` tool is not installed.
    #[error("patch is not installed or not found in PATH")]
    PatchToolNotFound,

    /// A patch did not apply cleanly.
    #[error("Failed to apply patch {patch} to Go module {module}")]
    PatchFailed {
        /// Module path
        module: String,
        /// Workspace-relative path of the patch file
        patch: String,
        /// Output from the patch tool
        stderr: String,
    },

    /// A build file template failed to render.
    #[error("failed to render {template}: {reason}")]
    TemplateError {
        /// Template name
        template: String,
        /// Renderer message
        reason: String,
    },

    /// An external tool needed for a query is not installed.
    #[error("{tool} is not installed or not found in PATH")]
    ToolNotFound {
        /// Name of the missing executable
        tool: String,
    },

    /// The build-graph reachability query failed.
    #[error("Build graph query failed: {command}")]
    QueryFailed {
        /// The command that was run
        command: String,
        /// Output from the command
        stderr: String,
    },

    /// A network request failed.
    #[error("Network error: {operation}: {reason}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// The advisory database reported at least one vulnerability.
    #[error("Found {count} vulnerabilities.")]
    VulnerabilitiesFound {
        /// Number of distinct vulnerabilities
        count: usize,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Whether a dependency reference came from a build or a test dependency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Listed under `deps`
    Build,
    /// Listed under `test_deps`
    Test,
}

/// One unresolved dependency reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// The package declaring the dependency
    pub package: String,
    /// The dependency that does not resolve
    pub dependency: String,
    /// Which list the reference came from
    pub kind: DependencyKind,
    /// The closest declared package name, if any is close enough
    pub suggestion: Option<String>,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DependencyKind::Build => write!(
                f,
                "Go package {} depends on {}, which is not specified.",
                self.package, self.dependency
            )?,
            DependencyKind::Test => write!(
                f,
                "Go package {} has test dependency {}, which is not specified.",
                self.package, self.dependency
            )?,
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, " Did you mean {suggestion}?")?;
        }

        Ok(())
    }
}

fn format_missing(missing: &[MissingDependency]) -> String {
    missing.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Error wrapper that adds user-facing details and a suggestion.
///
/// ```rust,no_run
/// use vdm::core::{ErrorContext, VdmError};
///
/// let context = ErrorContext::new(VdmError::PatchToolNotFound)
///     .with_suggestion("Install patch using your package manager")
///     .with_details("Modules with patches are patched after download");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: VdmError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: VdmError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`VdmError`] (tailored suggestions), [`std::io::Error`] and
/// [`toml::de::Error`]; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let messages: Vec<String> = error.chain().map(ToString::to_string).collect();

    let error = match error.downcast::<VdmError>() {
        Ok(vdm_error) => {
            let own = vdm_error.to_string();
            let context: Vec<&str> = messages
                .iter()
                .map(String::as_str)
                .filter(|message| !own.contains(message))
                .collect();
            return with_context_lines(create_error_context(vdm_error), &context);
        }
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(VdmError::FileSystemError {
                    operation: "access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check file ownership and permissions in the workspace")
                .with_details(io_error.to_string());
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(VdmError::FileSystemError {
                    operation: "access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(io_error.to_string());
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(VdmError::ManifestParseError {
            file: crate::constants::DEPS_FILE.to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your manifest. Verify quotes, brackets, and table headers");
    }

    // Generic error: keep the whole cause chain
    let mut message = error.to_string();
    if messages.len() > 1 {
        message.push_str("\n\nCaused by:");
        for (i, cause) in messages.iter().skip(1).enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(VdmError::Other {
        message,
    })
}

/// Prefix the details with any context layered on top of a [`VdmError`].
fn with_context_lines(mut ctx: ErrorContext, context: &[&str]) -> ErrorContext {
    if context.is_empty() {
        return ctx;
    }

    let mut details = context.join("\n");
    if let Some(existing) = ctx.details.take() {
        details.push('\n');
        details.push_str(&existing);
    }
    ctx.details = Some(details);
    ctx
}

/// Attach suggestions to the [`VdmError`] variants users can act on.
fn create_error_context(error: VdmError) -> ErrorContext {
    match &error {
        VdmError::ManifestNotFound { path } => {
            let details = format!("VDM reads the dependency set from {path} at the workspace root");
            ErrorContext::new(error)
                .with_suggestion("Run vdm from the workspace root, or pass --workspace")
                .with_details(details)
        }

        VdmError::ManifestParseError { file, .. } => {
            let suggestion = format!(
                "Check the TOML syntax in {file}. Each module is a [[module]] table with [[module.package]] entries"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        VdmError::IncompleteDependencyGraph { .. } => ErrorContext::new(error)
            .with_suggestion("Add the missing packages to deps.toml, or remove the references to them")
            .with_details("Every package named in deps or test_deps must be declared by some module"),

        VdmError::VendorNotDirectory { .. } => ErrorContext::new(error)
            .with_suggestion("Move the file out of the way so the vendor directory can be created"),

        VdmError::PatchToolNotFound => ErrorContext::new(error)
            .with_suggestion("Install patch using your package manager (e.g. 'apt install patch')")
            .with_details("Modules that declare patches are patched with the system patch tool after download"),

        VdmError::PatchFailed { patch, stderr, .. } => {
            let suggestion = format!("Check that {patch} still applies to the pinned module version");
            let details = stderr.clone();
            ErrorContext::new(error).with_suggestion(suggestion).with_details(details)
        }

        VdmError::ToolNotFound { tool } => {
            let suggestion = format!("Install {tool} and make sure it is on your PATH");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        VdmError::QueryFailed { stderr, .. } => {
            let details = stderr.clone();
            ErrorContext::new(error)
                .with_suggestion("Check that the root selectors name valid Bazel targets")
                .with_details(details)
        }

        VdmError::FetchError { .. } | VdmError::NetworkError { .. } => ErrorContext::new(error)
            .with_suggestion("Check your network connection and the --proxy / --osv-url settings"),

        VdmError::VulnerabilitiesFound { .. } => ErrorContext::new(error)
            .with_suggestion("Update the affected modules to a fixed version, then run vdm vendor"),

        _ => ErrorContext::new(error),
    }
}
