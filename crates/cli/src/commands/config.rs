//! Configuration commands

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use wedtest_common::HarnessConfig;

use crate::output::{print_info, print_success};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file
    #[arg(long)]
    pub write: bool,
}

pub fn execute(args: &ConfigArgs, config: &HarnessConfig, path: &Path) -> Result<()> {
    if args.write {
        config
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        print_success(&format!("Wrote {}", path.display()));
        return Ok(());
    }

    print_info(&format!("Effective configuration ({})", path.display()));
    print!("{}", config.to_toml()?);
    Ok(())
}
