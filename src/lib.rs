//! VDM - Vendoring Dependency Manager
//!
//! VDM vendors pinned Go modules into a Bazel workspace. A single declarative
//! manifest, `deps.toml`, lists every module with its exact version and the
//! packages inside it that the build uses; `vdm vendor` makes `vendor/` match
//! it exactly, downloading modules, applying patches and generating a
//! `BUILD.bazel` for every package.
//!
//! # Architecture Overview
//!
//! A run is a straight pipeline:
//!
//! ```text
//! deps.toml ──▶ manifest ──▶ planner ──▶ cache filter ──▶ actions (in order)
//!                               ▲              ▲
//!                        vendor/ tree   vendor/manifest.toml
//! ```
//!
//! - The **planner** reads the manifest and the vendor tree and produces the
//!   full list of [`actions::Action`]s needed to converge, as if nothing were
//!   vendored yet, plus the removal of anything stale.
//! - The **cache** drops downloads whose module directory provably already
//!   holds the right content, using the digests recorded in
//!   `vendor/manifest.toml` by the previous run.
//! - **Actions** run one at a time. Each is idempotent; a failed run is
//!   repaired by running again.
//!
//! # Modules
//!
//! - [`manifest`] - `deps.toml` schema, loading and validation
//! - [`planner`] - plan computation and minimal stale-entry removal
//! - [`cache`] - digest-based download elision
//! - [`actions`] - the closed set of filesystem operations
//! - [`proxy`] - Go module proxy client behind the [`proxy::ModuleSource`] seam
//! - [`templating`] - `BUILD.bazel` rendering
//! - [`check`] - unused-dependency and vulnerability audit
//! - [`cli`] - command-line interface
//! - [`config`] - workspace and endpoint resolution
//! - [`core`] - error types
//! - [`tools`] - running `patch` and `bazel`
//! - [`utils`] - filesystem helpers, digests, progress bars
//!
//! # Manifest Format (deps.toml)
//!
//! ```toml
//! [[module]]
//! name = "rsc.io/quote"
//! version = "v1.5.2"
//! patches = ["third_party/quote.patch"]
//!
//! [[module.package]]
//! name = "rsc.io/quote"
//! deps = ["rsc.io/sampler"]
//! test_deps = ["golang.org/x/text/language"]
//!
//! [[module.directory]]
//! name = "rsc.io/quote/testdata"
//! exports_files = ["golden.txt"]
//! ```

pub mod actions;
pub mod cache;
pub mod check;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod manifest;
pub mod planner;
pub mod proxy;
pub mod templating;
pub mod tools;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
