//! I/O operations for manifest files.
//!
//! This module contains all file I/O for the data model:
//! - Loading `deps.toml` from the workspace root
//! - Reading a cache manifest, if one exists and parses
//! - Rendering the cache manifest and the JSON interchange form

use crate::constants::CACHE_MANIFEST_HEADER;
use crate::core::VdmError;
use crate::core::file_error::{FileOperation, FileResultExt};
use crate::manifest::Deps;
use anyhow::{Context, Result};
use std::path::Path;

impl Deps {
    /// Load and validate a manifest from disk.
    ///
    /// # Errors
    ///
    /// - [`VdmError::ManifestNotFound`] if the file does not exist
    /// - [`VdmError::ManifestParseError`] if the TOML is malformed or has
    ///   fields outside the schema
    /// - [`VdmError::ManifestValidationError`] if a structural rule is broken
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path).with_file_context(
            FileOperation::Read,
            path,
            "reading dependency manifest",
        ) {
            Ok(content) => content,
            Err(error) if error.is_not_found() => {
                return Err(VdmError::ManifestNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Err(error) => return Err(error.into()),
        };

        let deps = Self::parse(&content, &path.display().to_string())?;
        deps.validate()?;
        Ok(deps)
    }

    /// Parse manifest text without validating it.
    ///
    /// `file` is only used in the error message.
    pub fn parse(content: &str, file: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            VdmError::ManifestParseError {
                file: file.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Read the cache manifest, if there is a usable one.
    ///
    /// Every failure degrades to `None`: a missing, unreadable or corrupt
    /// cache manifest only means nothing is cached.
    #[must_use]
    pub fn load_cached(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no cache manifest at {}", path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable cache manifest {}: {e}", path.display());
                return None;
            }
        };

        match toml::from_str(&content) {
            Ok(deps) => Some(deps),
            Err(e) => {
                tracing::warn!("ignoring corrupt cache manifest {}: {e}", path.display());
                None
            }
        }
    }

    /// Render the cache manifest document, header included.
    pub fn to_cache_manifest_string(&self) -> Result<String> {
        let body = toml::to_string_pretty(self).context("Failed to serialize cache manifest")?;
        Ok(format!("{CACHE_MANIFEST_HEADER}{body}"))
    }

    /// Render the manifest as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize manifest to JSON")
    }
}
