//! Loopcheck CLI - Generate, distort, and compare test audio.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loopcheck")]
#[command(author, version, about = "Audio loopback verification toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test signals
    Generate(commands::generate::GenerateArgs),

    /// Apply distortions and filters to a WAV file
    Distort(commands::distort::DistortArgs),

    /// Align a recording with its original and report similarity metrics
    Evaluate(commands::evaluate::EvaluateArgs),

    /// Run a full scenario: generate, distort, evaluate
    Run(commands::run::RunArgs),

    /// Display WAV file information
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Distort(args) => commands::distort::run(args),
        Commands::Evaluate(args) => commands::evaluate::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
