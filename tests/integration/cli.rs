use predicates::prelude::*;
use vdm::test_utils::{ManifestFixture, TestWorkspace};

use crate::common::vdm;

#[test]
fn test_help_lists_commands() {
    vdm(std::path::Path::new("."))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vendor"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("json"))
        .stdout(predicate::str::contains("update"));
}

#[test]
fn test_vendor_dry_run_prints_plan() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();
    workspace.create_file("vendor/random", "stray").unwrap();

    vdm(workspace.path())
        .args(["vendor", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("remove vendor/random\n"))
        .stdout(predicate::str::contains(
            "download Go module rsc.io/quote@v1.5.2 to vendor/rsc.io/quote\n",
        ))
        .stdout(predicate::str::contains(
            "generate BUILD file for Go package golang.org/x/text/language to vendor/golang.org/x/text/language/BUILD.bazel\n",
        ))
        .stdout(predicate::str::ends_with("generate cache manifest to vendor/manifest.toml\n"));

    assert!(workspace.exists("vendor/random"));
    assert!(!workspace.exists("vendor/rsc.io"));
}

#[test]
fn test_vendor_empty_manifest() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::empty()).unwrap();
    workspace.create_file("vendor/rsc.io/quote/quote.go", "package quote").unwrap();

    vdm(workspace.path()).args(["vendor", "-q"]).assert().success();
    assert!(!workspace.exists("vendor"));
}

#[test]
fn test_vendor_incomplete_graph_fails() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::incomplete()).unwrap();

    vdm(workspace.path())
        .arg("vendor")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Go package rsc.io/quote depends on rsc.io/sampler, which is not specified.",
        ));
}

#[test]
fn test_vendor_invalid_manifest_fails() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::invalid_syntax()).unwrap();

    vdm(workspace.path())
        .arg("vendor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("deps.toml"));
}

#[test]
fn test_vendor_not_a_directory_fails() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();
    workspace.create_file("vendor", "not a directory").unwrap();

    vdm(workspace.path())
        .arg("vendor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn test_vendor_unreachable_proxy_fails() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();

    vdm(workspace.path())
        .arg("vendor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("rsc.io/quote@v1.5.2"));
    assert!(!workspace.exists("vendor/manifest.toml"));
}

#[test]
fn test_missing_manifest_fails() {
    let workspace = TestWorkspace::new().unwrap();

    vdm(workspace.path())
        .arg("json")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Dependency manifest not found"));
}

#[test]
fn test_json_dumps_manifest() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();

    let output = vdm(workspace.path()).arg("json").assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["module"][0]["name"], "rsc.io/quote");
    assert_eq!(json["module"][0]["package"][0]["deps"][0], "rsc.io/sampler");
    assert_eq!(json["module"][2]["package"][0]["no_tests"], true);
}

#[test]
fn test_check_empty_manifest_succeeds() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::empty()).unwrap();

    vdm(workspace.path()).arg("check").assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn test_update_empty_manifest_is_up_to_date() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::empty()).unwrap();

    vdm(workspace.path())
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_workspace_from_bazel_run() {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();

    let mut cmd = assert_cmd::Command::cargo_bin("vdm").unwrap();
    cmd.env("BUILD_WORKSPACE_DIRECTORY", workspace.path())
        .env_remove("VDM_WORKSPACE")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("rsc.io/sampler"));
}
