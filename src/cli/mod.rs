//! Command-line interface for VDM.
//!
//! Each subcommand lives in its own module with its own argument struct and
//! an `execute` method taking the resolved [`Config`]:
//!
//! - `vendor` - bring `vendor/` in line with `deps.toml`
//! - `check` - report unused and test-only packages, fail on known vulnerabilities
//! - `json` - print `deps.toml` as JSON
//! - `update` - bump pinned module versions to the newest compatible release
//!
//! # Global Options
//!
//! - `-v`, `--verbose` - more logging (`-v` info, `-vv` debug)
//! - `-q`, `--quiet` - errors only, no progress bars
//! - `--workspace` - workspace root (env `VDM_WORKSPACE`)
//! - `--proxy` - Go module proxy (env `VDM_PROXY`)
//! - `--osv-url` - OSV API (env `VDM_OSV_URL`)
//!
//! `RUST_LOG`, when set, overrides the verbosity flags.
//!
//! # Example
//!
//! ```bash
//! # Preview what would change
//! vdm vendor --dry-run
//!
//! # Vendor for a WORKSPACE-based build
//! vdm vendor --naming workspace
//!
//! # Audit the binaries under //cmd
//! vdm check //cmd/...
//! ```

mod check;
mod json;
mod update;
pub mod vendor;


use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "vdm",
    about = "Vendoring Dependency Manager - vendor pinned Go modules into a Bazel workspace",
    version,
    long_about = "VDM vendors the Go modules listed in deps.toml into vendor/, generating \
                  BUILD.bazel files for every package so the whole tree builds hermetically."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Workspace root (defaults to $BUILD_WORKSPACE_DIRECTORY, then the current directory)
    #[arg(long, global = true, env = "VDM_WORKSPACE", value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Go module proxy base URL
    #[arg(long, global = true, env = "VDM_PROXY", value_name = "URL")]
    proxy: Option<String>,

    /// OSV API base URL
    #[arg(long, global = true, env = "VDM_OSV_URL", value_name = "URL")]
    osv_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Vendor the dependencies in deps.toml
    Vendor(vendor::VendorCommand),

    /// Check dependencies for unused packages and vulnerabilities
    Check(check::CheckCommand),

    /// Print deps.toml as JSON
    Json(json::JsonCommand),

    /// Update pinned Go modules to their newest compatible versions
    Update(update::UpdateCommand),
}

impl Cli {
    /// The `tracing` filter directive for the verbosity flags.
    #[must_use]
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "vdm=error";
        }
        match self.verbose {
            0 => "vdm=warn",
            1 => "vdm=info",
            _ => "vdm=debug",
        }
    }

    /// Resolve the configuration and run the subcommand.
    pub async fn execute(self) -> Result<()> {
        let config = Config::resolve(self.workspace, self.proxy, self.osv_url)?;
        match self.command {
            Commands::Vendor(cmd) => cmd.execute(&config, self.quiet).await,
            Commands::Check(cmd) => cmd.execute(&config).await,
            Commands::Json(cmd) => cmd.execute(&config),
            Commands::Update(cmd) => cmd.execute(&config, self.quiet).await,
        }
    }
}
