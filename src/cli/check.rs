//! Audit the declared dependencies.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::check::{BazelQuery, OsvClient, check_dependencies, format_vulnerabilities};
use crate::config::Config;
use crate::core::VdmError;
use crate::manifest::Deps;

/// Command to report unused dependencies and known vulnerabilities.
#[derive(Args, Debug, Default)]
pub struct CheckCommand {
    /// Bazel target patterns whose dependencies count as used (default: //...)
    #[arg(value_name = "ROOT")]
    roots: Vec<String>,
}

impl CheckCommand {
    /// Run the audit, failing if any vulnerability is found.
    pub async fn execute(self, config: &Config) -> Result<()> {
        let deps = Deps::load(&config.manifest_path())?;
        let oracle = BazelQuery::new(config.root());
        let advisories = OsvClient::new(&config.osv_url, &config.user_agent)?;

        let report = check_dependencies(&deps, &self.roots, &oracle, &advisories).await?;
        if deps.is_empty() {
            return Ok(());
        }
        print!("{}", report.usage);

        if !report.vulnerabilities.is_empty() {
            eprint!("{}", format_vulnerabilities(&report.vulnerabilities).red());
            return Err(VdmError::VulnerabilitiesFound {
                count: report.vulnerabilities.len(),
            }
            .into());
        }
        Ok(())
    }
}
