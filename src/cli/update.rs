//! Bump pinned Go modules to newer compatible releases.
//!
//! Each module is considered on its own: the proxy's version list is
//! filtered to releases (no pre-releases or pseudo-versions) with the same
//! major version as the pin, and the highest one newer than the pin wins.
//! `deps.toml` is edited in place with `toml_edit`, so comments, ordering and
//! formatting outside the changed `version` values survive.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use semver::Version;
use toml_edit::{DocumentMut, Item};
use tracing::debug;

use crate::config::Config;
use crate::core::VdmError;
use crate::core::file_error::{FileOperation, FileResultExt};
use crate::manifest::Deps;
use crate::proxy::ModuleProxy;
use crate::utils::fs::atomic_write;

/// Command to update pinned module versions.
#[derive(Args, Debug, Default)]
pub struct UpdateCommand {
    /// Show available updates without editing deps.toml
    #[arg(long)]
    dry_run: bool,
}

/// A version bump for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleUpdate {
    /// Module path
    pub module: String,
    /// Version currently pinned in deps.toml
    pub from: String,
    /// Version to pin instead
    pub to: String,
}

impl UpdateCommand {
    pub async fn execute(self, config: &Config, quiet: bool) -> Result<()> {
        let manifest_path = config.manifest_path();
        let deps = Deps::load(&manifest_path)?;
        let proxy = ModuleProxy::new(&config.proxy_url, &config.user_agent)?;

        let mut updates = Vec::new();
        for module in &deps.modules {
            let versions = proxy.list_versions(&module.name).await?;
            match newest_compatible(&module.version, &versions) {
                Some(newer) => updates.push(ModuleUpdate {
                    module: module.name.clone(),
                    from: module.version.clone(),
                    to: newer,
                }),
                None => debug!("{}@{} is up to date", module.name, module.version),
            }
        }

        if updates.is_empty() {
            if !quiet {
                println!("{} All Go modules are up to date", "✓".green());
            }
            return Ok(());
        }

        if !quiet {
            println!("Found {} update(s):", updates.len());
            for update in &updates {
                println!("  {} {} → {}", update.module.cyan(), update.from.yellow(), update.to.green());
            }
        }
        if self.dry_run {
            return Ok(());
        }

        let content = std::fs::read_to_string(&manifest_path).with_file_context(
            FileOperation::Read,
            &manifest_path,
            "reading dependency manifest",
        )?;
        let updated = apply_updates(&content, &updates)?;
        atomic_write(&manifest_path, updated.as_bytes())
            .with_context(|| format!("Failed to update {}", manifest_path.display()))?;
        Ok(())
    }
}

fn parse_go_version(version: &str) -> Option<Version> {
    Version::parse(version.strip_prefix('v')?).ok()
}

/// Pick the highest release in `available` that shares `current`'s major
/// version and is newer than it.
#[must_use]
pub fn newest_compatible(current: &str, available: &[String]) -> Option<String> {
    let pinned = parse_go_version(current)?;
    available
        .iter()
        .filter_map(|candidate| parse_go_version(candidate).map(|version| (version, candidate)))
        .filter(|(version, _)| version.pre.is_empty() && version.build.is_empty())
        .filter(|(version, _)| version.major == pinned.major && *version > pinned)
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, candidate)| candidate.clone())
}

/// Rewrite the `version` of each updated module in a `deps.toml` document.
pub fn apply_updates(content: &str, updates: &[ModuleUpdate]) -> Result<String> {
    let mut doc: DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        VdmError::ManifestParseError {
            file: crate::constants::DEPS_FILE.to_string(),
            reason: e.to_string(),
        }
    })?;

    let modules = doc.get_mut("module").and_then(Item::as_array_of_tables_mut).ok_or_else(|| {
        VdmError::ManifestValidationError {
            reason: "no [[module]] entries to update".to_string(),
        }
    })?;

    for update in updates {
        let table = modules
            .iter_mut()
            .find(|table| table.get("name").and_then(Item::as_str) == Some(update.module.as_str()))
            .ok_or_else(|| VdmError::ManifestValidationError {
                reason: format!("Go module {} is not in the manifest", update.module),
            })?;

        let value = table.get_mut("version").and_then(Item::as_value_mut).ok_or_else(|| {
            VdmError::ManifestValidationError {
                reason: format!("Go module {} has no version", update.module),
            }
        })?;
        let decor = value.decor().clone();
        *value = toml_edit::Value::from(update.to.as_str());
        *value.decor_mut() = decor;
    }

    Ok(doc.to_string())
}
