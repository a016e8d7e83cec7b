//! Go module retrieval.
//!
//! [`ModuleSource`] is the seam between the `Download` action and the network:
//! it hands back the module's zip archive as bytes and nothing more. The
//! default implementation, [`ModuleProxy`], speaks the Go module proxy
//! protocol:
//!
//! - `GET <proxy>/<module>/@v/<version>.zip` for the archive
//! - `GET <proxy>/<module>/@v/list` for the known versions (used by `vdm update`)
//!
//! Module paths and versions are case-escaped: every upper-case letter becomes
//! `!` followed by its lower-case form, so `github.com/BurntSushi/toml` is
//! requested as `github.com/!burnt!sushi/toml`.

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::VdmError;

/// Something that can produce a Go module's zip archive.
#[allow(async_fn_in_trait)]
pub trait ModuleSource {
    /// Fetch the zip archive for `module` at exactly `version`.
    async fn fetch(&self, module: &str, version: &str) -> Result<Vec<u8>>;
}

/// A client for a Go module proxy.
#[derive(Debug, Clone)]
pub struct ModuleProxy {
    client: reqwest::Client,
    base_url: String,
}

impl ModuleProxy {
    /// Create a client for the proxy at `base_url`, identifying as `user_agent`.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client for the module proxy")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, module: &str, suffix: &str) -> String {
        format!("{}/{}/@v/{suffix}", self.base_url, escape_path(module))
    }

    async fn get(&self, url: &str, operation: &str) -> Result<reqwest::Response> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| VdmError::NetworkError {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VdmError::NetworkError {
                operation: operation.to_string(),
                reason: format!("HTTP {status}: {}", body.trim()),
            }
            .into());
        }
        Ok(response)
    }

    /// List the versions the proxy knows for `module`, in proxy order.
    pub async fn list_versions(&self, module: &str) -> Result<Vec<String>> {
        let url = self.url(module, "list");
        let body = self
            .get(&url, &format!("listing versions of {module}"))
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read version list for {module}"))?;

        Ok(body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }
}

impl ModuleSource for ModuleProxy {
    async fn fetch(&self, module: &str, version: &str) -> Result<Vec<u8>> {
        let url = self.url(module, &format!("{}.zip", escape_path(version)));
        let response = self.get(&url, &format!("downloading {module}@{version}")).await.map_err(
            |e| VdmError::FetchError {
                module: module.to_string(),
                version: version.to_string(),
                reason: e.to_string(),
            },
        )?;

        let bytes = response.bytes().await.map_err(|e| VdmError::FetchError {
            module: module.to_string(),
            version: version.to_string(),
            reason: e.to_string(),
        })?;
        debug!("downloaded {} bytes for {module}@{version}", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Case-escape a module path or version for use in a proxy URL.
#[must_use]
pub fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}
