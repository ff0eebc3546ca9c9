//! Configuration inspection.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use nettone_config::{SynthConfig, default_config_path};

use super::load_config;

#[derive(Args)]
pub struct ConfigArgs {
    /// Print the default config file location and exit
    #[arg(long)]
    path: bool,

    /// Write the effective configuration to the default location
    #[arg(long)]
    init: bool,

    /// Overwrite an existing file with --init
    #[arg(long, requires = "init")]
    force: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    if args.path {
        println!("{}", default_config_path().display());
        return Ok(());
    }

    let config: SynthConfig = load_config(config_path)?;

    if args.init {
        let target = default_config_path();
        if target.exists() && !args.force {
            anyhow::bail!("{} already exists (use --force to overwrite)", target.display());
        }
        config
            .save(&target)
            .with_context(|| format!("writing {}", target.display()))?;
        println!("Wrote {}", target.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
