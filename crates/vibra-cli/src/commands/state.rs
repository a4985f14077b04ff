//! Binary parameter state: save from a configuration, inspect a saved file.

use super::common::EffectSelection;
use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use vibra_config::EffectConfig;
use vibra_core::KernelOptions;
use vibra_host::EffectInstance;

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    command: StateCommand,
}

#[derive(Subcommand)]
enum StateCommand {
    /// Write the state bytes for an effect configuration
    Save {
        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        selection: EffectSelection,
    },

    /// Decode a state file and print the values
    Show {
        /// State file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Effect the state belongs to
        #[arg(short, long)]
        effect: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Write the decoded values as a configuration file
        #[arg(long, value_name = "TOML")]
        to_config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct DecodedState {
    effect: &'static str,
    expected_bytes: usize,
    received_bytes: usize,
    params: Vec<(&'static str, f32)>,
}

pub fn run(args: StateArgs) -> anyhow::Result<()> {
    match args.command {
        StateCommand::Save { output, selection } => {
            let instance = EffectInstance::from_config(&selection.to_config()?)?;
            let bytes = instance.save_state();
            std::fs::write(&output, &bytes)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} bytes ({} parameters of {}) to {}",
                bytes.len(),
                instance.params().len(),
                instance.effect_id(),
                output.display()
            );
        }
        StateCommand::Show {
            file,
            effect,
            json,
            to_config,
        } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let instance = EffectInstance::new(&effect, KernelOptions::default())?;
            let report = instance.load_state(&bytes);
            let decoded = DecodedState {
                effect: instance.effect_id(),
                expected_bytes: report.expected,
                received_bytes: report.received,
                params: instance
                    .params()
                    .params()
                    .iter()
                    .map(|p| (p.name(), p.get()))
                    .collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&decoded)?);
            } else {
                println!("{} state, {} of {} bytes", decoded.effect, report.received, report.expected);
                for (name, value) in &decoded.params {
                    println!("  {name:12} {value}");
                }
            }

            if let Some(path) = to_config {
                EffectConfig::capture(instance.effect_id(), instance.params(), instance.options())
                    .save(&path)?;
                tracing::info!(path = %path.display(), "configuration written");
            }
        }
    }
    Ok(())
}
