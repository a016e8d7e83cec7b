use vdm::actions::Action;
use vdm::cache::strip_cached_actions;
use vdm::cli::vendor::VendorCommand;
use vdm::manifest::Deps;
use vdm::planner::plan;
use vdm::templating::NamingConvention;
use vdm::test_utils::{ManifestFixture, TestWorkspace};

use crate::common::{quote_modules, vendor};

fn replan(workspace: &TestWorkspace) -> Vec<Action> {
    let deps = Deps::load(&workspace.path().join("deps.toml")).unwrap();
    let actions = plan(workspace.path(), &deps, NamingConvention::Bzlmod).unwrap();
    strip_cached_actions(workspace.path(), actions)
}

async fn vendored_quote() -> TestWorkspace {
    let workspace = TestWorkspace::with_manifest(&ManifestFixture::quote()).unwrap();
    vendor(workspace.path(), &quote_modules(), &VendorCommand::default()).await.unwrap();
    workspace
}

#[tokio::test]
async fn test_replan_after_vendor_only_regenerates() {
    let workspace = vendored_quote().await;

    let actions = replan(&workspace);
    assert!(
        actions.iter().all(|action| matches!(
            action,
            Action::GeneratePackageBuild { .. }
                | Action::GenerateDirectoryBuild { .. }
                | Action::CopyBuildFile { .. }
                | Action::WriteCacheManifest { .. }
        )),
        "unexpected actions: {actions:?}"
    );
    assert!(matches!(actions.last(), Some(Action::WriteCacheManifest { .. })));
}

#[tokio::test]
async fn test_second_run_fetches_nothing_and_is_byte_identical() {
    let workspace = vendored_quote().await;
    let before: Vec<(String, String)> = workspace
        .vendor_files()
        .into_iter()
        .map(|path| {
            let content = workspace.read_file(&path).unwrap();
            (path, content)
        })
        .collect();

    let source = quote_modules();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();
    assert!(source.fetched().is_empty());

    let after: Vec<(String, String)> = workspace
        .vendor_files()
        .into_iter()
        .map(|path| {
            let content = workspace.read_file(&path).unwrap();
            (path, content)
        })
        .collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_local_edit_forces_redownload_of_that_module() {
    let workspace = vendored_quote().await;
    workspace
        .create_file("vendor/rsc.io/sampler/sampler.go", "package sampler\n\n// local hack\n")
        .unwrap();

    let source = quote_modules();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();

    assert_eq!(source.fetched(), ["rsc.io/sampler@v1.3.0"]);
    assert!(!workspace.read_file("vendor/rsc.io/sampler/sampler.go").unwrap().contains("local hack"));
}

#[tokio::test]
async fn test_version_change_forces_redownload() {
    let workspace = vendored_quote().await;
    let manifest = workspace.read_file("deps.toml").unwrap();
    workspace
        .create_file("deps.toml", &manifest.replace("v1.3.0", "v1.99.0"))
        .unwrap();

    let source = quote_modules().with_module(
        "rsc.io/sampler",
        "v1.99.0",
        &[("sampler.go", "package sampler\n// v1.99.0\n")],
    );
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();

    assert_eq!(source.fetched(), ["rsc.io/sampler@v1.99.0"]);
    assert!(workspace.read_file("vendor/manifest.toml").unwrap().contains("v1.99.0"));
    assert!(replan(&workspace).iter().all(|action| !action.is_download()));
}

#[tokio::test]
async fn test_no_cache_redownloads_everything() {
    let workspace = vendored_quote().await;
    let source = quote_modules();
    let cmd = VendorCommand {
        no_cache: true,
        ..Default::default()
    };

    vendor(workspace.path(), &source, &cmd).await.unwrap();
    assert_eq!(source.fetched().len(), 3);
}

#[tokio::test]
async fn test_lost_cache_manifest_redownloads_everything() {
    let workspace = vendored_quote().await;
    std::fs::remove_file(workspace.path().join("vendor/manifest.toml")).unwrap();

    assert_eq!(replan(&workspace).iter().filter(|action| action.is_download()).count(), 3);
}

#[tokio::test]
async fn test_corrupt_cache_manifest_degrades_to_full_run() {
    let workspace = vendored_quote().await;
    workspace.create_file("vendor/manifest.toml", "this is [not toml").unwrap();

    let source = quote_modules();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();
    assert_eq!(source.fetched().len(), 3);
    assert!(Deps::load_cached(&workspace.path().join("vendor/manifest.toml")).is_some());
}

#[tokio::test]
async fn test_recovers_from_interrupted_run() {
    let workspace = vendored_quote().await;
    std::fs::remove_dir_all(workspace.path().join("vendor/rsc.io/quote")).unwrap();

    let source = quote_modules();
    vendor(workspace.path(), &source, &VendorCommand::default()).await.unwrap();
    assert_eq!(source.fetched(), ["rsc.io/quote@v1.5.2"]);
    assert!(workspace.exists("vendor/rsc.io/quote/BUILD.bazel"));
}
