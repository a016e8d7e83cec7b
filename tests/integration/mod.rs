//! Integration test suite for VDM
//!
//! End-to-end tests that run whole vendoring passes against temporary
//! workspaces, either through the library with an in-memory module source or
//! through the `vdm` binary. Nothing here touches the network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **vendor**: full vendoring passes, stale-entry removal, patches, overrides
//! - **idempotence**: re-planning after a run, cache invalidation on edits
//! - **cli**: the binary's surface (`--dry-run`, `json`, `check`, exit codes)

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod idempotence;
mod vendor;
