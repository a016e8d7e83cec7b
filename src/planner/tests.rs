use super::*;
use crate::manifest::{GoModule, GoPackage, TextFiles, is_strict_descendant};
use std::fs;
use tempfile::{TempDir, tempdir};

fn package(name: &str) -> GoPackage {
    GoPackage {
        name: name.to_string(),
        ..Default::default()
    }
}

fn module(name: &str, version: &str, packages: Vec<GoPackage>) -> GoModule {
    GoModule {
        name: name.to_string(),
        version: version.to_string(),
        packages,
        ..Default::default()
    }
}

fn quote_deps() -> Deps {
    Deps {
        modules: vec![module("rsc.io/quote", "v1.2.3", vec![package("rsc.io/quote")])],
    }
}

fn workspace(files: &[&str], dirs: &[&str]) -> TempDir {
    let temp = tempdir().unwrap();
    for dir in dirs {
        fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    for file in files {
        let path = temp.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "contents").unwrap();
    }
    temp
}

fn removals(actions: &[Action]) -> Vec<&str> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::RemoveAll {
                path,
            } => Some(path.as_str()),
            _ => None,
        })
        .collect()
}

fn descriptions(actions: &[Action]) -> Vec<String> {
    actions.iter().map(ToString::to_string).collect()
}

#[test]
fn test_empty_manifest_removes_vendor() {
    let temp = workspace(&["vendor/rsc.io/quote/quote.go"], &[]);
    let actions = plan(temp.path(), &Deps::default(), NamingConvention::Bzlmod).unwrap();
    assert_eq!(
        actions,
        [Action::RemoveAll {
            path: "vendor".to_string()
        }]
    );
}

#[test]
fn test_single_module_empty_tree() {
    let temp = tempdir().unwrap();
    let deps = quote_deps();
    let actions = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap();

    assert_eq!(
        actions,
        [
            Action::Download {
                module: deps.modules[0].clone(),
                path: "vendor/rsc.io/quote".to_string(),
                nested: vec![],
            },
            Action::GeneratePackageBuild {
                package: deps.modules[0].packages[0].clone(),
                path: "vendor/rsc.io/quote/BUILD.bazel".to_string(),
                naming: NamingConvention::Bzlmod,
            },
            Action::WriteCacheManifest {
                deps: deps.clone(),
                path: "vendor/manifest.toml".to_string(),
            },
        ]
    );
    assert_eq!(
        descriptions(&actions),
        [
            "download Go module rsc.io/quote@v1.2.3 to vendor/rsc.io/quote",
            "generate BUILD file for Go package rsc.io/quote to vendor/rsc.io/quote/BUILD.bazel",
            "generate cache manifest to vendor/manifest.toml",
        ]
    );
}

#[test]
fn test_stray_file_and_directory_removed_first() {
    let temp = workspace(&["vendor/random", "vendor/manifest.toml"], &["vendor/parent/child"]);
    let actions = plan(temp.path(), &quote_deps(), NamingConvention::Bzlmod).unwrap();

    assert_eq!(
        descriptions(&actions[..2]),
        ["remove vendor/random", "remove vendor/parent"]
    );
    assert!(actions[2].is_download());
    assert_eq!(actions.len(), 5);
}

#[test]
fn test_undeclared_module_and_sibling_directory() {
    let temp = workspace(
        &[
            "vendor/golang.org/x/crypto/ssh/ssh.go",
            "vendor/rsc.io/2fa/main.go",
            "vendor/rsc.io/quote/quote.go",
        ],
        &[],
    );
    let actions = plan(temp.path(), &quote_deps(), NamingConvention::Bzlmod).unwrap();
    assert_eq!(removals(&actions), ["vendor/golang.org", "vendor/rsc.io/2fa"]);
}

#[test]
fn test_prefix_sibling_is_not_nested() {
    let temp = workspace(&["vendor/rsc.io2/quote/quote.go", "vendor/rsc.io/other/x.go"], &[]);
    let deps = Deps {
        modules: vec![module("rsc.io", "v1.0.0", vec![package("rsc.io")])],
    };
    let actions = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap();
    assert_eq!(removals(&actions), ["vendor/rsc.io2"]);
}

#[test]
fn test_removal_set_is_minimal_and_safe() {
    let temp = workspace(
        &[
            "vendor/a/b/c/d.go",
            "vendor/a/b/e.go",
            "vendor/golang.org/x/text/language/lang.go",
            "vendor/golang.org/x/net/http2/http2.go",
            "vendor/golang.org/y/z.go",
            "vendor/loose.txt",
        ],
        &["vendor/empty/nested"],
    );
    let deps = Deps {
        modules: vec![
            module("golang.org/x/text", "v0.14.0", vec![package("golang.org/x/text/language")]),
            module("golang.org/x/net/http2", "v0.19.0", vec![package("golang.org/x/net/http2")]),
        ],
    };
    let actions = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap();
    let removed = removals(&actions);
    assert_eq!(
        removed,
        ["vendor/loose.txt", "vendor/a", "vendor/empty", "vendor/golang.org/y"]
    );

    for (i, a) in removed.iter().enumerate() {
        for b in &removed[i + 1..] {
            assert!(!is_strict_descendant(a, b) && !is_strict_descendant(b, a));
        }
        for module in &deps.modules {
            let dir = vendor_path(&module.name);
            assert!(*a != dir && !is_strict_descendant(&dir, a));
        }
    }
}

#[test]
fn test_removals_precede_creations_and_manifest_is_last() {
    let temp = workspace(&["vendor/stale/x.go", "vendor/loose"], &[]);
    let mut deps = quote_deps();
    deps.modules.push(module("rsc.io/sampler", "v1.3.0", vec![package("rsc.io/sampler")]));
    let actions = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap();

    let first_creation = actions.iter().position(|a| !matches!(a, Action::RemoveAll { .. })).unwrap();
    assert!(actions[first_creation..].iter().all(|a| !matches!(a, Action::RemoveAll { .. })));
    assert!(matches!(actions.last(), Some(Action::WriteCacheManifest { .. })));
    assert_eq!(
        actions.iter().filter(|a| matches!(a, Action::WriteCacheManifest { .. })).count(),
        1
    );
}

#[test]
fn test_build_file_override_and_directories() {
    let temp = tempdir().unwrap();
    let mut deps = quote_deps();
    deps.modules[0].packages.push(GoPackage {
        name: "rsc.io/quote/buggy".to_string(),
        build_file: Some("third_party/buggy.BUILD".to_string()),
        ..Default::default()
    });
    deps.modules[0].directories.push(TextFiles {
        name: "rsc.io/quote/testdata".to_string(),
        exports_files: vec!["golden.txt".to_string()],
    });

    let actions = plan(temp.path(), &deps, NamingConvention::Workspace).unwrap();
    assert_eq!(
        descriptions(&actions),
        [
            "download Go module rsc.io/quote@v1.2.3 to vendor/rsc.io/quote",
            "generate BUILD file for Go package rsc.io/quote to vendor/rsc.io/quote/BUILD.bazel",
            "copy BUILD file from third_party/buggy.BUILD to vendor/rsc.io/quote/buggy/BUILD.bazel",
            "generate BUILD file for text files rsc.io/quote/testdata to vendor/rsc.io/quote/testdata/BUILD.bazel",
            "generate cache manifest to vendor/manifest.toml",
        ]
    );
    assert!(matches!(
        actions[1],
        Action::GeneratePackageBuild {
            naming: NamingConvention::Workspace,
            ..
        }
    ));
}

#[test]
fn test_incomplete_graph_lists_every_violation() {
    let temp = tempdir().unwrap();
    let deps = Deps {
        modules: vec![
            module(
                "rsc.io/quote",
                "v1.5.2",
                vec![GoPackage {
                    name: "rsc.io/quote".to_string(),
                    deps: vec!["rsc.io/sample".to_string(), "golang.org/x/text".to_string()],
                    test_deps: vec!["rsc.io/testonly".to_string()],
                    ..Default::default()
                }],
            ),
            module("rsc.io/sampler", "v1.3.0", vec![package("rsc.io/sampler")]),
        ],
    };

    let error = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap_err();
    let Some(VdmError::IncompleteDependencyGraph {
        missing,
    }) = error.downcast_ref::<VdmError>()
    else {
        panic!("unexpected error: {error}");
    };

    assert_eq!(missing.len(), 3);
    assert_eq!(missing[0].dependency, "rsc.io/sample");
    assert_eq!(missing[0].suggestion.as_deref(), Some("rsc.io/sampler"));
    assert_eq!(missing[1].dependency, "golang.org/x/text");
    assert_eq!(missing[1].suggestion, None);
    assert_eq!(missing[2].kind, DependencyKind::Test);
    assert!(error.to_string().contains(
        "Go package rsc.io/quote has test dependency rsc.io/testonly, which is not specified."
    ));
}

#[test]
fn test_incomplete_graph_checked_before_tree() {
    // The graph error wins even when the tree itself is unusable.
    let temp = workspace(&["vendor"], &[]);
    let mut deps = quote_deps();
    deps.modules[0].packages[0].deps = vec!["rsc.io/sampler".to_string()];

    let error = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<VdmError>(),
        Some(VdmError::IncompleteDependencyGraph { .. })
    ));
}

#[test]
fn test_vendor_must_be_a_directory() {
    let temp = workspace(&["vendor"], &[]);
    let error = plan(temp.path(), &quote_deps(), NamingConvention::Bzlmod).unwrap_err();
    assert!(matches!(error.downcast_ref::<VdmError>(), Some(VdmError::VendorNotDirectory { .. })));
}

#[test]
fn test_plan_is_deterministic() {
    let temp = workspace(
        &["vendor/z/a.go", "vendor/b/c.go", "vendor/m", "vendor/a", "vendor/rsc.io/x/y.go"],
        &[],
    );
    let deps = quote_deps();
    let first = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap();
    let second = plan(temp.path(), &deps, NamingConvention::Bzlmod).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        removals(&first),
        ["vendor/a", "vendor/m", "vendor/b", "vendor/rsc.io/x", "vendor/z"]
    );
}

#[test]
fn test_plan_does_not_modify_tree() {
    let temp = workspace(&["vendor/stale/x.go", "vendor/random"], &[]);
    plan(temp.path(), &quote_deps(), NamingConvention::Bzlmod).unwrap();
    assert!(temp.path().join("vendor/stale/x.go").exists());
    assert!(temp.path().join("vendor/random").exists());
}
