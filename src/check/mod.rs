//! Dependency audit: unused packages, test-only packages, known vulnerabilities.
//!
//! The audit reads the same [`Deps`] as the planner but never touches the
//! vendor tree. It has two independent halves:
//!
//! - **Usage.** A [`ReachabilityOracle`] (by default `bazel query`, see
//!   [`BazelQuery`]) reports which vendored packages the build graph reaches
//!   from the given roots. A declared package is *used* if the oracle returns
//!   it or if it is a dependency of a returned package. Counting build and
//!   test edges gives the unused set; counting build edges only gives the
//!   packages that are reached just through tests.
//! - **Vulnerabilities.** An [`AdvisoryDatabase`] (by default OSV, see
//!   [`OsvClient`]) is asked about every declared module in one batch. Any
//!   finding fails the audit.

mod bazel;
mod osv;


use anyhow::Result;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Write as _};
use tracing::{debug, info};

use crate::manifest::Deps;

pub use bazel::BazelQuery;
pub use osv::{Affected, AffectedPackage, OsvClient, Reference, Vulnerability};

/// Build-graph root used when none is given.
pub const DEFAULT_ROOT: &str = "//...";

/// Answers which vendored packages a build actually depends on.
#[allow(async_fn_in_trait)]
pub trait ReachabilityOracle {
    /// Return the Go package names (`rsc.io/quote`, not labels) under the
    /// vendor root that are reachable from `roots`.
    async fn reachable_packages(&self, roots: &[String]) -> Result<Vec<String>>;
}

/// Looks up published advisories for pinned module versions.
#[allow(async_fn_in_trait)]
pub trait AdvisoryDatabase {
    /// Return every advisory affecting any of the `(module, version)` pairs.
    /// Duplicates across modules are allowed.
    async fn query(&self, modules: &[(String, String)]) -> Result<Vec<Vulnerability>>;
}

/// Package usage across the declared dependency set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageReport {
    /// Declared modules
    pub modules: usize,
    /// Declared packages
    pub packages: usize,
    /// Packages nothing depends on, sorted
    pub unused: Vec<String>,
    /// Packages only reachable through test dependencies, sorted
    pub tests_only: Vec<String>,
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Go modules: {} ({} packages, {} unused, {} used only in tests)",
            self.modules,
            self.packages,
            self.unused.len(),
            self.tests_only.len()
        )?;
        if !self.tests_only.is_empty() {
            writeln!(f, "Dependencies used only in tests:")?;
            for package in &self.tests_only {
                writeln!(f, "  //vendor/{package}")?;
            }
        }
        if !self.unused.is_empty() {
            writeln!(f, "Unused dependencies:")?;
            for package in &self.unused {
                writeln!(f, "  //vendor/{package}")?;
            }
        }
        Ok(())
    }
}

/// Everything `vdm check` found.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Package usage
    pub usage: UsageReport,
    /// Unique advisories, sorted by identifier
    pub vulnerabilities: Vec<Vulnerability>,
}

/// Classify every declared package given the packages the build reaches.
///
/// `used` entries that are not declared packages are ignored.
#[must_use]
pub fn analyze_usage(deps: &Deps, used: &[String]) -> UsageReport {
    let mut all_edges: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut build_edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for package in deps.packages() {
        let build: Vec<&str> = package.deps.iter().map(String::as_str).collect();
        let mut all = build.clone();
        all.extend(package.test_deps.iter().map(String::as_str));
        all_edges.insert(&package.name, all);
        build_edges.insert(&package.name, build);
    }

    let mut unused: BTreeSet<&str> = all_edges.keys().copied().collect();
    let mut tests_only = unused.clone();
    for package in used {
        let (Some(all), Some(build)) =
            (all_edges.get(package.as_str()), build_edges.get(package.as_str()))
        else {
            debug!("ignoring undeclared package {package} in build graph");
            continue;
        };

        unused.remove(package.as_str());
        tests_only.remove(package.as_str());
        for child in all {
            unused.remove(child);
        }
        for child in build {
            tests_only.remove(child);
        }
    }

    UsageReport {
        modules: deps.modules.len(),
        packages: deps.package_count(),
        unused: unused.into_iter().map(ToString::to_string).collect(),
        tests_only: tests_only.into_iter().map(ToString::to_string).collect(),
    }
}

/// Deduplicate advisories by identifier and sort them.
#[must_use]
pub fn dedupe_vulnerabilities(vulnerabilities: Vec<Vulnerability>) -> Vec<Vulnerability> {
    let mut seen = BTreeSet::new();
    let mut unique: Vec<Vulnerability> =
        vulnerabilities.into_iter().filter(|vuln| seen.insert(vuln.id.clone())).collect();
    unique.sort_by(|a, b| a.id.cmp(&b.id));
    unique
}

/// Render advisories in the report format printed to stderr.
#[must_use]
pub fn format_vulnerabilities(vulnerabilities: &[Vulnerability]) -> String {
    let mut out = String::new();
    for (i, vuln) in vulnerabilities.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&vuln.id);
        if !vuln.aliases.is_empty() {
            let _ = write!(out, " ({})", vuln.aliases.join(", "));
        }
        out.push_str("\n\tAffected modules:\n");
        for affected in &vuln.affected {
            let _ = writeln!(out, "\t\t{}", affected.package.name);
        }
        if !vuln.references.is_empty() {
            out.push_str("\tReferences:\n");
            for reference in &vuln.references {
                let _ = writeln!(out, "\t\t{}", reference.url);
            }
        }
    }
    out
}

/// Run both halves of the audit.
///
/// An empty manifest is trivially clean and queries neither collaborator.
/// Oracle and advisory failures are fatal; vulnerabilities are returned in
/// the report for the caller to act on.
pub async fn check_dependencies<O, A>(
    deps: &Deps,
    roots: &[String],
    oracle: &O,
    advisories: &A,
) -> Result<CheckReport>
where
    O: ReachabilityOracle,
    A: AdvisoryDatabase,
{
    if deps.is_empty() {
        return Ok(CheckReport::default());
    }

    let roots: Vec<String> = if roots.is_empty() {
        vec![DEFAULT_ROOT.to_string()]
    } else {
        roots.to_vec()
    };

    let used = oracle.reachable_packages(&roots).await?;
    debug!("build graph reaches {} vendored packages", used.len());
    let usage = analyze_usage(deps, &used);

    let modules: Vec<(String, String)> = deps
        .modules
        .iter()
        .map(|module| (module.name.clone(), module.version.clone()))
        .collect();
    let vulnerabilities = dedupe_vulnerabilities(advisories.query(&modules).await?);
    info!(
        "{} unused, {} test-only, {} vulnerabilities",
        usage.unused.len(),
        usage.tests_only.len(),
        vulnerabilities.len()
    );

    Ok(CheckReport {
        usage,
        vulnerabilities,
    })
}
