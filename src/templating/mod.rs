//! BUILD file rendering.
//!
//! Every vendored package gets a `BUILD.bazel` produced from the Go template
//! unless the manifest supplies its own, and every plain-file directory gets
//! one from the files template. Both templates are compiled into the binary
//! and rendered with Tera; the `starlark` and `label` filters (see
//! [`filters`]) keep the output in the layout buildifier would produce, so
//! regenerating an unchanged package is a byte-identical overwrite.
//!
//! The template context for a Go package is:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `package` | the manifest entry, as written |
//! | `rules_repo` | `rules_go` or `io_bazel_rules_go`, per [`NamingConvention`] |
//! | `load_rules` | rule names used by the file, for the `load` statement |
//! | `library_name` | base name, with `_lib` appended for binaries |
//! | `binary_name` | base name of the import path |
//! | `srcs` / `test_srcs` | source files found in the package directory |
//! | `include_tests` | whether a `go_test` target is emitted |
//! | `test_size` | `test_size`, or `small` |

pub mod filters;


use anyhow::Result;
use serde::Serialize;
use tera::{Context as TeraContext, Tera};

use crate::core::VdmError;
use crate::manifest::{GoPackage, TextFiles};

const GO_TEMPLATE: &str = "go-BUILD.bazel";
const FILES_TEMPLATE: &str = "files-BUILD.bazel";

/// Which repository name the generated files use to load `rules_go`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NamingConvention {
    /// Bzlmod (`MODULE.bazel`) names: `@rules_go`
    #[default]
    Bzlmod,
    /// Legacy `WORKSPACE` names: `@io_bazel_rules_go`
    Workspace,
}

impl NamingConvention {
    /// Repository name for `rules_go`.
    #[must_use]
    pub const fn rules_go(self) -> &'static str {
        match self {
            Self::Bzlmod => "rules_go",
            Self::Workspace => "io_bazel_rules_go",
        }
    }
}

/// Source files found in a package directory, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFiles {
    /// `*.go` (excluding tests) and `*.s` files
    pub srcs: Vec<String>,
    /// `*_test.go` files
    pub test_srcs: Vec<String>,
}

impl PackageFiles {
    /// Sort a set of file names into sources and test sources.
    ///
    /// Anything that is neither Go nor assembly is ignored.
    pub fn classify<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files = Self::default();
        for name in names {
            let name = name.into();
            if name.ends_with("_test.go") {
                files.test_srcs.push(name);
            } else if name.ends_with(".go") || name.ends_with(".s") {
                files.srcs.push(name);
            }
        }
        files.srcs.sort();
        files.test_srcs.sort();
        files
    }
}

#[derive(Serialize)]
struct GoPackageContext<'a> {
    package: &'a GoPackage,
    rules_repo: &'static str,
    load_rules: Vec<&'static str>,
    library_name: String,
    binary_name: &'a str,
    srcs: &'a [String],
    test_srcs: &'a [String],
    include_tests: bool,
    test_size: &'a str,
}

/// Renders BUILD files from the built-in templates.
pub struct BuildFileRenderer {
    tera: Tera,
}

impl BuildFileRenderer {
    /// Compile the built-in templates and register the Starlark filters.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("starlark", filters::starlark);
        tera.register_filter("label", filters::label);
        tera.add_raw_templates(vec![
            (GO_TEMPLATE, include_str!("templates/go-BUILD.tera")),
            (FILES_TEMPLATE, include_str!("templates/files-BUILD.tera")),
        ])
        .map_err(|e| VdmError::TemplateError {
            template: "built-in templates".to_string(),
            reason: format_tera_error(&e),
        })?;

        Ok(Self {
            tera,
        })
    }

    /// Render the BUILD file for a Go package.
    pub fn render_package(
        &self,
        package: &GoPackage,
        files: &PackageFiles,
        naming: NamingConvention,
    ) -> Result<String> {
        let binary_name = base_name(&package.name);
        let library_name = if package.binary {
            format!("{binary_name}_lib")
        } else {
            binary_name.to_string()
        };
        let include_tests = !package.no_tests && !files.test_srcs.is_empty();

        let mut load_rules = Vec::with_capacity(3);
        if package.binary {
            load_rules.push("go_binary");
        }
        load_rules.push("go_library");
        if include_tests {
            load_rules.push("go_test");
        }

        let context = GoPackageContext {
            package,
            rules_repo: naming.rules_go(),
            load_rules,
            library_name,
            binary_name,
            srcs: &files.srcs,
            test_srcs: &files.test_srcs,
            include_tests,
            test_size: package.test_size.as_deref().unwrap_or("small"),
        };
        self.render(GO_TEMPLATE, &context)
    }

    /// Render the BUILD file for a plain-file directory.
    pub fn render_directory(&self, directory: &TextFiles) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("directory", directory);
        self.render_context(FILES_TEMPLATE, &context)
    }

    fn render(&self, template: &str, value: &impl Serialize) -> Result<String> {
        let context = TeraContext::from_serialize(value).map_err(|e| VdmError::TemplateError {
            template: template.to_string(),
            reason: format_tera_error(&e),
        })?;
        self.render_context(template, &context)
    }

    fn render_context(&self, template: &str, context: &TeraContext) -> Result<String> {
        let rendered = self.tera.render(template, context).map_err(|e| VdmError::TemplateError {
            template: template.to_string(),
            reason: format_tera_error(&e),
        })?;

        let mut out = rendered.trim_end().to_string();
        out.push('\n');
        Ok(out)
    }
}

fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Flatten a Tera error and its sources into one message.
fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }
    messages.join("\n  → ")
}
