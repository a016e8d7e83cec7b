//! Structured filesystem error handling for VDM
//!
//! Filesystem failures are the most common fatal errors during planning and
//! execution. Rather than parsing `std::io::Error` messages after the fact,
//! callers attach the operation, the path, and a short purpose at the call
//! site through [`FileResultExt::with_file_context`].
//!
//! ```rust,no_run
//! use vdm::core::{FileOperation, FileResultExt};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), vdm::core::FileOperationError> {
//! let path = Path::new("deps.toml");
//! let content = std::fs::read_to_string(path).with_file_context(
//!     FileOperation::Read,
//!     path,
//!     "reading dependency manifest",
//! )?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Types of filesystem operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading a file completely
    Read,
    /// Writing a file
    Write,
    /// Listing a directory
    ReadDir,
    /// Walking a directory tree
    Walk,
    /// Getting file metadata
    Metadata,
    /// Creating a directory
    CreateDir,
    /// Copying a file
    Copy,
    /// Removing a file or directory tree
    Remove,
    /// Changing permissions
    Permissions,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::ReadDir => write!(f, "listing"),
            FileOperation::Walk => write!(f, "walking"),
            FileOperation::Metadata => write!(f, "getting metadata for"),
            FileOperation::CreateDir => write!(f, "creating directory"),
            FileOperation::Copy => write!(f, "copying"),
            FileOperation::Remove => write!(f, "removing"),
            FileOperation::Permissions => write!(f, "changing permissions on"),
        }
    }
}

/// A filesystem error with the operation, path and purpose attached.
#[derive(Error, Debug)]
#[error("Failed {operation} {} ({purpose})", file_path.display())]
pub struct FileOperationError {
    /// The type of operation that failed
    pub operation: FileOperation,
    /// The path that was being accessed
    pub file_path: PathBuf,
    /// Why the path was being accessed
    pub purpose: String,
    /// The underlying IO error
    #[source]
    pub source: std::io::Error,
}

impl FileOperationError {
    /// Create a new file operation error.
    pub fn new(
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self {
            operation,
            file_path: file_path.into(),
            purpose: purpose.into(),
            source,
        }
    }

    /// Whether the underlying error means the path does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == std::io::ErrorKind::NotFound
    }
}

/// Extension trait for Result types to add file operation context
pub trait FileResultExt<T> {
    /// Add file operation context to a Result
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
    ) -> Result<T, FileOperationError>;
}

impl<T> FileResultExt<T> for Result<T, std::io::Error> {
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
    ) -> Result<T, FileOperationError> {
        self.map_err(|io_error| FileOperationError::new(operation, file_path, purpose, io_error))
    }
}
