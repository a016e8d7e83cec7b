//! An in-memory [`ModuleSource`] for tests.

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;

use crate::proxy::ModuleSource;

/// Serves module archives registered up front and records every fetch.
#[derive(Debug, Default)]
pub struct MemoryModuleSource {
    archives: HashMap<(String, String), Vec<u8>>,
    fetched: Mutex<Vec<String>>,
}

impl MemoryModuleSource {
    /// An empty source; every fetch fails until modules are added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module@version` with the given `(path, contents)` files.
    #[must_use]
    pub fn with_module(mut self, module: &str, version: &str, files: &[(&str, &str)]) -> Self {
        let archive = build_module_zip(module, version, files);
        self.archives.insert((module.to_string(), version.to_string()), archive);
        self
    }

    /// Register a raw archive, for testing malformed ones.
    #[must_use]
    pub fn with_archive(mut self, module: &str, version: &str, archive: Vec<u8>) -> Self {
        self.archives.insert((module.to_string(), version.to_string()), archive);
        self
    }

    /// Every `module@version` fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|fetched| fetched.clone()).unwrap_or_default()
    }
}

impl ModuleSource for MemoryModuleSource {
    async fn fetch(&self, module: &str, version: &str) -> Result<Vec<u8>> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(format!("{module}@{version}"));
        }
        self.archives
            .get(&(module.to_string(), version.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("{module}@{version} is not available"))
    }
}

/// Build a Go module zip: every file lives under `<module>@<version>/`.
///
/// # Panics
///
/// Panics if the archive cannot be written, which only happens on a bug in
/// the zip writer.
#[must_use]
pub fn build_module_zip(module: &str, version: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (path, contents) in files {
        writer.start_file(format!("{module}@{version}/{path}"), options).expect("start zip entry");
        writer.write_all(contents.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}
