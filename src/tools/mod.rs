//! External tool invocation.
//!
//! VDM shells out for two things: the system `patch` tool, applied to freshly
//! downloaded modules, and `bazel query`, used by `vdm check` to find which
//! vendored packages the build graph reaches.

pub mod command;

pub use command::{ToolCommand, ToolOutput};
