//! Bring `vendor/` in line with `deps.toml`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;
use tracing::info;

use crate::actions::{Action, ExecutionContext};
use crate::cache::strip_cached_actions;
use crate::config::Config;
use crate::manifest::Deps;
use crate::planner::plan;
use crate::proxy::{ModuleProxy, ModuleSource};
use crate::templating::{BuildFileRenderer, NamingConvention};
use crate::utils::progress::ProgressBar;

/// Command to vendor the dependencies in `deps.toml`.
#[derive(Args, Debug, Default)]
pub struct VendorCommand {
    /// Re-download every module, ignoring vendor/manifest.toml
    #[arg(long)]
    pub no_cache: bool,

    /// Print the actions instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Repository naming used in generated BUILD files
    #[arg(long, value_enum, default_value = "bzlmod")]
    pub naming: NamingConvention,
}

impl VendorCommand {
    /// Vendor the workspace in `config`, fetching from the configured proxy.
    pub async fn execute(self, config: &Config, quiet: bool) -> Result<()> {
        let deps = Deps::load(&config.manifest_path())?;
        let source = ModuleProxy::new(&config.proxy_url, &config.user_agent)?;
        self.run(config.root(), &deps, &source, quiet).await?;
        Ok(())
    }

    /// Plan, filter and apply (or print) the actions for `deps` under `root`.
    ///
    /// Returns the actions that were applied or printed. Execution stops at
    /// the first failing action.
    pub async fn run<S: ModuleSource>(
        &self,
        root: &Path,
        deps: &Deps,
        source: &S,
        quiet: bool,
    ) -> Result<Vec<Action>> {
        let mut actions = plan(root, deps, self.naming)?;
        let planned = actions.len();
        if !self.no_cache {
            actions = strip_cached_actions(root, actions);
        }
        info!("{} actions planned, {} after cache", planned, actions.len());

        if self.dry_run {
            for action in &actions {
                println!("{action}");
            }
            return Ok(actions);
        }

        let renderer = BuildFileRenderer::new()?;
        let ctx = ExecutionContext::new(root, source, &renderer);
        let progress = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(actions.len() as u64)
        };

        for action in &actions {
            progress.set_message(action.to_string());
            if let Err(e) = action.execute(&ctx).await {
                progress.finish_and_clear();
                return Err(e).with_context(|| format!("failed to {action}"));
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        if !quiet {
            let downloads = actions.iter().filter(|action| action.is_download()).count();
            println!(
                "{} Vendored {} Go modules ({} downloaded, {} cached)",
                "✓".green(),
                deps.modules.len(),
                downloads,
                deps.modules.len().saturating_sub(downloads)
            );
        }
        Ok(actions)
    }
}
