//! Core error types for VDM
//!
//! This module holds the error vocabulary shared by every other module:
//!
//! - [`VdmError`] - Enumerated error types covering every fatal failure mode
//! - [`ErrorContext`] - User-friendly error wrapper with details and suggestions
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//! - [`file_error`] - Structured filesystem errors that name the operation and path
//!
//! # Example
//!
//! ```rust
//! use vdm::core::{DependencyKind, MissingDependency, VdmError};
//!
//! let error = VdmError::IncompleteDependencyGraph {
//!     missing: vec![MissingDependency {
//!         package: "rsc.io/quote".to_string(),
//!         dependency: "rsc.io/sampler".to_string(),
//!         kind: DependencyKind::Build,
//!         suggestion: None,
//!     }],
//! };
//! assert!(error.to_string().contains("rsc.io/sampler"));
//! ```

pub mod error;
pub mod file_error;

pub use error::{DependencyKind, ErrorContext, MissingDependency, VdmError, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
