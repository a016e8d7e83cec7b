//! Ready-made `deps.toml` documents.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::DEPS_FILE;

/// A named `deps.toml` document.
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    pub name: String,
    pub content: String,
}

impl ManifestFixture {
    /// `rsc.io/quote` depending on `rsc.io/sampler`, with a test-only
    /// dependency on `golang.org/x/text/language`.
    pub fn quote() -> Self {
        Self {
            name: "quote".to_string(),
            content: r#"
[[module]]
name = "rsc.io/quote"
version = "v1.5.2"

[[module.package]]
name = "rsc.io/quote"
deps = ["rsc.io/sampler"]
test_deps = ["golang.org/x/text/language"]

[[module]]
name = "rsc.io/sampler"
version = "v1.3.0"

[[module.package]]
name = "rsc.io/sampler"

[[module]]
name = "golang.org/x/text"
version = "v0.14.0"

[[module.package]]
name = "golang.org/x/text/language"
no_tests = true
"#
            .trim()
            .to_string(),
        }
    }

    /// A manifest with no modules.
    pub fn empty() -> Self {
        Self {
            name: "empty".to_string(),
            content: String::new(),
        }
    }

    /// A manifest whose dependency graph names an undeclared package.
    pub fn incomplete() -> Self {
        Self {
            name: "incomplete".to_string(),
            content: r#"
[[module]]
name = "rsc.io/quote"
version = "v1.5.2"

[[module.package]]
name = "rsc.io/quote"
deps = ["rsc.io/sampler"]
"#
            .trim()
            .to_string(),
        }
    }

    /// A manifest with a TOML syntax error.
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: "[[module]\nname = \"rsc.io/quote\"".to_string(),
        }
    }

    /// Write the fixture as `deps.toml` in `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(DEPS_FILE);
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write {} fixture", self.name))?;
        Ok(path)
    }
}
