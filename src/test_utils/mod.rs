//! Test utilities for VDM
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`init_test_logging`] to see `tracing` output while debugging a test
//! - [`TestWorkspace`] for a throwaway workspace with a manifest and vendor tree
//! - [`ManifestFixture`] for ready-made `deps.toml` documents
//! - [`MemoryModuleSource`] serving module zips built in memory, so the
//!   `Download` action runs without a network
//!
//! # Example
//!
//! ```rust,no_run
//! use vdm::test_utils::{ManifestFixture, MemoryModuleSource, TestWorkspace};
//!
//! let workspace = TestWorkspace::new().unwrap();
//! ManifestFixture::quote().write_to(workspace.path()).unwrap();
//! let source = MemoryModuleSource::new()
//!     .with_module("rsc.io/quote", "v1.5.2", &[("quote.go", "package quote\n")]);
//! ```

pub mod environment;
pub mod fixtures;
pub mod module_source;

pub use environment::TestWorkspace;
pub use fixtures::ManifestFixture;
pub use module_source::{MemoryModuleSource, build_module_zip};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run silently.
///
/// ```bash
/// RUST_LOG=vdm=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
