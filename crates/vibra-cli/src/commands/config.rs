//! Effect configuration files: write defaults, check strictly.

use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use vibra_config::{EffectConfig, EffectRegistry};
use vibra_core::KernelOptions;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a configuration holding an effect's defaults
    Init {
        /// Effect id
        #[arg(value_name = "EFFECT")]
        effect: String,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Validate a configuration: names, formats and ranges
    Check {
        /// Configuration file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let registry = EffectRegistry::new();
    match args.command {
        ConfigCommand::Init { effect, output } => {
            let params = registry
                .create_params(&effect)
                .ok_or_else(|| anyhow::anyhow!("Unknown effect: {}", effect))?;
            let id = registry.get(&effect).map_or(effect.as_str(), |d| d.id);
            EffectConfig::capture(id, &params, &KernelOptions::default()).save(&output)?;
            println!("Wrote {}", output.display());
        }
        ConfigCommand::Check { file } => {
            let config =
                EffectConfig::load(&file).with_context(|| format!("loading {}", file.display()))?;
            config.validate(&registry)?;
            println!("{}: ok ({} parameters set)", file.display(), config.params.len());
        }
    }
    Ok(())
}
