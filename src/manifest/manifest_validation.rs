//! Structural validation of a parsed manifest.
//!
//! Graph completeness (every dependency reference resolves) is not checked
//! here; the planner owns it so that every violation can be reported at once
//! alongside the plan that would have been built.

use crate::core::VdmError;
use crate::manifest::{Deps, is_within};
use anyhow::Result;
use std::collections::HashSet;

impl Deps {
    /// Validate the manifest structure.
    ///
    /// # Validation Rules
    ///
    /// - Module names and versions are non-empty
    /// - Module names are unique
    /// - Every module declares at least one package
    /// - Package names are non-empty, unique across the manifest, and equal
    ///   to or nested under their module's name
    /// - Directory names are nested under their module's name
    ///
    /// # Errors
    ///
    /// Returns [`VdmError::ManifestValidationError`] naming the first broken rule.
    pub fn validate(&self) -> Result<()> {
        let mut modules = HashSet::new();
        let mut packages = HashSet::new();

        for module in &self.modules {
            if module.name.is_empty() {
                return Err(invalid("Go module has no name".to_string()));
            }
            if module.version.is_empty() {
                return Err(invalid(format!("Go module {} has no version", module.name)));
            }
            if !modules.insert(module.name.as_str()) {
                return Err(invalid(format!("Go module {} is specified more than once", module.name)));
            }
            if module.packages.is_empty() {
                return Err(invalid(format!("Go module {} has no packages", module.name)));
            }

            for package in &module.packages {
                if package.name.is_empty() {
                    return Err(invalid(format!("Go module {} has a package with no name", module.name)));
                }
                if !is_within(&package.name, &module.name) {
                    return Err(invalid(format!(
                        "Go package {} is not in Go module {}",
                        package.name, module.name
                    )));
                }
                if !packages.insert(package.name.as_str()) {
                    return Err(invalid(format!(
                        "Go package {} is specified more than once",
                        package.name
                    )));
                }
            }

            for directory in &module.directories {
                if directory.name.is_empty() || !is_within(&directory.name, &module.name) {
                    return Err(invalid(format!(
                        "directory {:?} is not in Go module {}",
                        directory.name, module.name
                    )));
                }
            }
        }

        Ok(())
    }
}

fn invalid(reason: String) -> anyhow::Error {
    VdmError::ManifestValidationError {
        reason,
    }
    .into()
}
