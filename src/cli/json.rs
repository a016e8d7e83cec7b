//! Print the dependency manifest as JSON.

use anyhow::Result;
use clap::Args;

use crate::config::Config;
use crate::manifest::Deps;

/// Command to dump `deps.toml` as pretty-printed JSON on stdout.
#[derive(Args, Debug, Default)]
pub struct JsonCommand {}

impl JsonCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let deps = Deps::load(&config.manifest_path())?;
        println!("{}", deps.to_json_pretty()?);
        Ok(())
    }
}
