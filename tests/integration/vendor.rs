use vdm::cli::vendor::VendorCommand;
use vdm::core::VdmError;
use vdm::test_utils::{ManifestFixture, MemoryModuleSource, TestWorkspace};

use crate::common::{quote_modules, vendor};

#[tokio::test]
async fn test_vendor_quote_fixture() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();
    let source = quote_modules();

    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();

    assert_eq!(
        source.fetched(),
        ["rsc.io/quote@v1.5.2", "rsc.io/sampler@v1.3.0", "golang.org/x/text@v0.14.0"]
    );
    assert_eq!(
        workspace.read_file("vendor/rsc.io/quote/BUILD.bazel").unwrap(),
        r#"load("@rules_go//go:def.bzl", "go_library", "go_test")

go_library(
    name = "quote",
    srcs = ["quote.go"],
    importpath = "rsc.io/quote",
    visibility = ["//visibility:public"],
    deps = ["//vendor/rsc.io/sampler"],
)

go_test(
    name = "quote_test",
    size = "small",
    srcs = ["quote_test.go"],
    embed = [":quote"],
    deps = ["//vendor/golang.org/x/text/language"],
)
"#
    );

    let language = workspace.read_file("vendor/golang.org/x/text/language/BUILD.bazel").unwrap();
    assert!(language.contains("srcs = [\"language.go\"],"));
    assert!(!language.contains("go_test"));

    let sampler = workspace.read_file("vendor/rsc.io/sampler/BUILD.bazel").unwrap();
    assert!(sampler.contains("\"glass.go\",\n        \"sampler.go\","));

    assert!(workspace.exists("vendor/golang.org/x/text/unicode/norm/norm.go"));
    assert!(!workspace.exists("vendor/golang.org/x/text/unicode/norm/BUILD.bazel"));
    assert!(
        workspace
            .read_file("vendor/manifest.toml")
            .unwrap()
            .starts_with("# Code generated by vdm. DO NOT EDIT.")
    );
}

#[tokio::test]
async fn test_vendor_removes_stale_entries() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();
    workspace.create_file("vendor/golang.org/x/crypto/ssh/ssh.go", "package ssh").unwrap();
    workspace.create_file("vendor/rsc.io/2fa/main.go", "package main").unwrap();
    workspace.create_file("vendor/random", "stray").unwrap();
    workspace.create_dir("vendor/parent/child").unwrap();

    let actions = vendor(workspace.path(), &quote_modules(), &VendorCommand::default()).await.unwrap();
    let removals: Vec<String> = actions
        .iter()
        .map(ToString::to_string)
        .filter(|action| action.starts_with("remove "))
        .collect();
    assert_eq!(
        removals,
        [
            "remove vendor/random",
            "remove vendor/golang.org/x/crypto",
            "remove vendor/parent",
            "remove vendor/rsc.io/2fa",
        ]
    );

    for path in ["vendor/golang.org/x/crypto", "vendor/rsc.io/2fa", "vendor/random", "vendor/parent"] {
        assert!(!workspace.exists(path), "{path} should have been removed");
    }
    assert!(workspace.exists("vendor/golang.org/x/text/language/language.go"));
    assert!(workspace.exists("vendor/rsc.io/quote/quote.go"));
}

#[tokio::test]
async fn test_vendor_empty_manifest_removes_vendor() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::empty()).unwrap();
    workspace.create_file("vendor/rsc.io/quote/quote.go", "package quote").unwrap();

    let source = MemoryModuleSource::new();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();

    assert!(!workspace.exists("vendor"));
    assert!(source.fetched().is_empty());
}

#[tokio::test]
async fn test_vendor_build_file_override_and_directory() {
    let workspace = TestWorkspace::new().unwrap();
    workspace
        .create_file(
            "deps.toml",
            r#"
[[module]]
name = "rsc.io/sampler"
version = "v1.3.0"

[[module.package]]
name = "rsc.io/sampler"
build_file = "third_party/sampler.BUILD"

[[module.directory]]
name = "rsc.io/sampler/testdata"
exports_files = ["golden.txt"]
"#,
        )
        .unwrap();
    workspace.create_file("third_party/sampler.BUILD", "# hand-written\n").unwrap();
    let source = MemoryModuleSource::new().with_module(
        "rsc.io/sampler",
        "v1.3.0",
        &[("sampler.go", "package sampler\n"), ("testdata/golden.txt", "golden\n")],
    );

    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();

    assert_eq!(workspace.read_file("vendor/rsc.io/sampler/BUILD.bazel").unwrap(), "# hand-written\n");
    assert!(
        workspace
            .read_file("vendor/rsc.io/sampler/testdata/BUILD.bazel")
            .unwrap()
            .contains("exports_files([\"golden.txt\"])")
    );
}

#[tokio::test]
async fn test_vendor_dry_run_changes_nothing() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();
    workspace.create_file("vendor/random", "stray").unwrap();
    let source = quote_modules();
    let cmd = VendorCommand {
        dry_run: true,
        ..Default::default()
    };

    let actions = vendor(workspace.path(), &source, &cmd).await.unwrap();

    assert_eq!(actions.first().map(ToString::to_string).as_deref(), Some("remove vendor/random"));
    assert!(source.fetched().is_empty());
    assert_eq!(workspace.vendor_files(), ["vendor/random"]);
}

#[tokio::test]
async fn test_vendor_halts_at_first_failure() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();
    let source = MemoryModuleSource::new().with_module(
        "rsc.io/quote",
        "v1.5.2",
        &[("quote.go", "package quote\n")],
    );

    let error = vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap_err();
    assert!(error.to_string().contains("download Go module rsc.io/sampler@v1.3.0"));

    assert_eq!(source.fetched(), ["rsc.io/quote@v1.5.2", "rsc.io/sampler@v1.3.0"]);
    assert!(workspace.exists("vendor/rsc.io/quote/BUILD.bazel"));
    assert!(!workspace.exists("vendor/golang.org"));
    assert!(!workspace.exists("vendor/manifest.toml"));
}

#[tokio::test]
async fn test_vendor_incomplete_graph_touches_nothing() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::incomplete()).unwrap();
    workspace.create_file("vendor/random", "stray").unwrap();
    let source = quote_modules();

    let error = vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<VdmError>(),
        Some(VdmError::IncompleteDependencyGraph { .. })
    ));
    assert!(source.fetched().is_empty());
    assert!(workspace.exists("vendor/random"));
}

#[tokio::test]
async fn test_vendor_nested_modules_inner_first() {
    let workspace = TestWorkspace::new().unwrap();
    workspace
        .create_file(
            "deps.toml",
            r#"
[[module]]
name = "rsc.io/quote/v3"
version = "v3.1.0"

[[module.package]]
name = "rsc.io/quote/v3"

[[module]]
name = "rsc.io/quote"
version = "v1.5.2"

[[module.package]]
name = "rsc.io/quote"
"#,
        )
        .unwrap();
    let modules = || {
        MemoryModuleSource::new()
            .with_module("rsc.io/quote/v3", "v3.1.0", &[("quote.go", "package quote // v3\n")])
            .with_module("rsc.io/quote", "v1.5.2", &[("quote.go", "package quote\n")])
    };

    let source = modules();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();
    assert_eq!(source.fetched(), ["rsc.io/quote/v3@v3.1.0", "rsc.io/quote@v1.5.2"]);
    assert_eq!(
        workspace.read_file("vendor/rsc.io/quote/v3/quote.go").unwrap(),
        "package quote // v3\n"
    );
    assert!(workspace.exists("vendor/rsc.io/quote/v3/BUILD.bazel"));
    assert!(workspace.exists("vendor/manifest.toml"));

    let source = modules();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();
    assert!(source.fetched().is_empty());

    // Only the outer module is stale; its download must leave v3 alone.
    workspace.create_file("vendor/rsc.io/quote/quote.go", "package quote // edited\n").unwrap();
    let source = modules();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();
    assert_eq!(source.fetched(), ["rsc.io/quote@v1.5.2"]);
    assert_eq!(
        workspace.read_file("vendor/rsc.io/quote/v3/quote.go").unwrap(),
        "package quote // v3\n"
    );
    assert!(workspace.exists("vendor/rsc.io/quote/v3/BUILD.bazel"));
}
