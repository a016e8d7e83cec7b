//! Common test utilities for VDM integration tests
//!
//! Wraps the library's `test_utils` with what only the integration suite
//! needs: running the `vdm` binary against a workspace, and the module
//! archives the quote fixture refers to.

// Not every helper is used by every test file
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
use vdm::cli::vendor::VendorCommand;
use vdm::manifest::Deps;
use vdm::actions::Action;
use vdm::test_utils::MemoryModuleSource;

/// An address nothing listens on, so a test that reaches the network fails
/// fast instead of talking to the real proxy.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// A `vdm` invocation rooted at `workspace`, isolated from the caller's
/// environment.
pub fn vdm(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vdm").unwrap();
    cmd.arg("--workspace")
        .arg(workspace)
        .arg("--proxy")
        .arg(UNREACHABLE_URL)
        .arg("--osv-url")
        .arg(UNREACHABLE_URL)
        .env("VDM_NO_PROGRESS", "1")
        .env_remove("BUILD_WORKSPACE_DIRECTORY")
        .env_remove("VDM_WORKSPACE")
        .env_remove("RUST_LOG");
    cmd
}

/// Serves every module in `ManifestFixture::quote()`.
pub fn quote_modules() -> MemoryModuleSource {
    MemoryModuleSource::new()
        .with_module(
            "rsc.io/quote",
            "v1.5.2",
            &[
                ("go.mod", "module rsc.io/quote\n\nrequire rsc.io/sampler v1.3.0\n"),
                (
                    "quote.go",
                    "package quote\n\nimport \"rsc.io/sampler\"\n\nfunc Hello() string { return sampler.Hello() }\n",
                ),
                ("quote_test.go", "package quote\n"),
            ],
        )
        .with_module(
            "rsc.io/sampler",
            "v1.3.0",
            &[
                ("go.mod", "module rsc.io/sampler\n"),
                ("sampler.go", "package sampler\n\nfunc Hello() string { return \"Hello, world.\" }\n"),
                ("glass.go", "package sampler\n"),
            ],
        )
        .with_module(
            "golang.org/x/text",
            "v0.14.0",
            &[
                ("go.mod", "module golang.org/x/text\n"),
                ("language/language.go", "package language\n"),
                ("language/language_test.go", "package language\n"),
                ("unicode/norm/norm.go", "package norm\n"),
            ],
        )
}

/// Run a full vendor of `workspace` against `source`, the way `vdm vendor` does.
pub async fn vendor(
    workspace: &Path,
    source: &MemoryModuleSource,
    cmd: &VendorCommand,
) -> anyhow::Result<Vec<Action>> {
    let deps = Deps::load(&workspace.join("deps.toml"))?;
    cmd.run(workspace, &deps, source, true).await
}
