//! OSV (<https://osv.dev>) as the advisory database.
//!
//! `POST /v1/querybatch` only returns advisory identifiers, so each unique
//! identifier is then fetched from `GET /v1/vulns/<id>`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::AdvisoryDatabase;
use crate::constants::{OSV_BATCH_LIMIT, OSV_ECOSYSTEM};
use crate::core::VdmError;

/// One advisory, as much of it as the report needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Vulnerability {
    /// Advisory identifier, e.g. `GO-2023-2402`
    pub id: String,
    /// Other identifiers for the same advisory (CVE, GHSA)
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Packages the advisory applies to
    #[serde(default)]
    pub affected: Vec<Affected>,
    /// Links to write-ups and fixes
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// A package entry in an advisory's `affected` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Affected {
    /// The affected package
    #[serde(default)]
    pub package: AffectedPackage,
}

/// The package named by an [`Affected`] entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AffectedPackage {
    /// Go module path
    #[serde(default)]
    pub name: String,
}

/// A link attached to an advisory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Reference {
    /// Target URL
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct BatchQuery<'a> {
    pub queries: Vec<Query<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct Query<'a> {
    pub package: Package<'a>,
    pub version: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct Package<'a> {
    pub name: &'a str,
    pub ecosystem: &'static str,
}

#[derive(Debug, Deserialize)]
pub(super) struct BatchResponse {
    #[serde(default)]
    pub results: Vec<BatchResult>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BatchResult {
    #[serde(default)]
    pub vulns: Vec<VulnerabilityId>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VulnerabilityId {
    pub id: String,
}

/// Build the batched queries, at most [`OSV_BATCH_LIMIT`] per request.
///
/// OSV spells Go versions without the leading `v`.
pub(super) fn batch_queries(modules: &[(String, String)]) -> Vec<BatchQuery<'_>> {
    modules
        .chunks(OSV_BATCH_LIMIT)
        .map(|chunk| BatchQuery {
            queries: chunk
                .iter()
                .map(|(name, version)| Query {
                    package: Package {
                        name,
                        ecosystem: OSV_ECOSYSTEM,
                    },
                    version: version.strip_prefix('v').unwrap_or(version),
                })
                .collect(),
        })
        .collect()
}

/// A client for the OSV API.
#[derive(Debug, Clone)]
pub struct OsvClient {
    client: reqwest::Client,
    base_url: String,
}

impl OsvClient {
    /// Create a client for the API at `base_url`, identifying as `user_agent`.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build().map_err(|e| {
            VdmError::NetworkError {
                operation: "creating advisory client".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<T> {
        let network_error = |reason: String| VdmError::NetworkError {
            operation: operation.to_string(),
            reason,
        };

        let response = request.send().await.map_err(|e| network_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(network_error(format!("HTTP {status}: {}", body.trim())).into());
        }
        Ok(response.json::<T>().await.map_err(|e| network_error(e.to_string()))?)
    }

    async fn query_batch(&self, batch: &BatchQuery<'_>) -> Result<BatchResponse> {
        let url = format!("{}/v1/querybatch", self.base_url);
        debug!("POST {url} ({} queries)", batch.queries.len());
        self.send(self.client.post(&url).json(batch), "querying advisories").await
    }

    async fn vulnerability(&self, id: &str) -> Result<Vulnerability> {
        let url = format!("{}/v1/vulns/{id}", self.base_url);
        debug!("GET {url}");
        self.send(self.client.get(&url), &format!("fetching advisory {id}")).await
    }
}

impl AdvisoryDatabase for OsvClient {
    async fn query(&self, modules: &[(String, String)]) -> Result<Vec<Vulnerability>> {
        let mut ids = BTreeSet::new();
        for batch in batch_queries(modules) {
            let response = self.query_batch(&batch).await?;
            for result in response.results {
                ids.extend(result.vulns.into_iter().map(|vuln| vuln.id));
            }
        }

        let mut vulnerabilities = Vec::with_capacity(ids.len());
        for id in &ids {
            vulnerabilities.push(self.vulnerability(id).await?);
        }
        Ok(vulnerabilities)
    }
}
