//! Throwaway workspaces for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use super::fixtures::ManifestFixture;
use crate::utils::fs::{relative_slash_path, workspace_path};

/// A temporary workspace root, removed on drop.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Create a workspace holding `fixture` as its manifest.
    pub fn with_manifest(fixture: &ManifestFixture) -> Result<Self> {
        let workspace = Self::new()?;
        fixture.write_to(workspace.path())?;
        Ok(workspace)
    }

    /// The workspace root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file at a workspace-relative `/` path, creating parents.
    pub fn create_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let full = workspace_path(self.path(), path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content).with_context(|| format!("Failed to write {path}"))?;
        Ok(full)
    }

    /// Create a directory at a workspace-relative `/` path.
    pub fn create_dir(&self, path: &str) -> Result<PathBuf> {
        let full = workspace_path(self.path(), path);
        fs::create_dir_all(&full)?;
        Ok(full)
    }

    /// Read a file at a workspace-relative `/` path.
    pub fn read_file(&self, path: &str) -> Result<String> {
        fs::read_to_string(workspace_path(self.path(), path))
            .with_context(|| format!("Failed to read {path}"))
    }

    /// Whether anything exists at a workspace-relative `/` path.
    pub fn exists(&self, path: &str) -> bool {
        workspace_path(self.path(), path).exists()
    }

    /// Every file under `vendor/`, as sorted workspace-relative paths.
    pub fn vendor_files(&self) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(self.path().join("vendor"))
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| relative_slash_path(self.path(), entry.path()))
            .collect();
        files.sort();
        files
    }
}
