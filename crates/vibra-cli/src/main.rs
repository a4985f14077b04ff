//! Vibra CLI - run vibra effects over WAV files and manage their state.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vibra")]
#[command(author, version, about = "Vibra effect kernel CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an audio file through an effect
    Process(commands::process::ProcessArgs),

    /// List available effects and their parameters
    Effects(commands::effects::EffectsArgs),

    /// Save or inspect binary parameter state
    State(commands::state::StateArgs),

    /// Create or check effect configuration files
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Effects(args) => commands::effects::run(args),
        Commands::State(args) => commands::state::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
