//! Utilities shared across the planner, the actions and the commands.
//!
//! # Modules
//!
//! - [`fs`] - File system operations with atomic writes and idempotent removal
//! - [`checksum`] - Deterministic content digests for modules and patch sets
//! - [`progress`] - Progress bars for action execution
//!
//! # Example
//!
//! ```rust,no_run
//! use vdm::utils::{atomic_write, checksum::digest_directory};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! atomic_write(Path::new("vendor/manifest.toml"), b"")?;
//! let digest = digest_directory(Path::new("vendor/rsc.io/quote"), &[])?;
//! println!("{digest}");
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod fs;
pub mod progress;

pub use checksum::Digest;
pub use fs::{atomic_write, ensure_dir, make_writable, remove_all};
pub use progress::ProgressBar;
