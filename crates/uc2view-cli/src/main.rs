mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "uc2view", about = "Inspect, decode and replay 16-bit imaging streams")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the packets of a recorded stream
    Info(commands::info::InfoArgs),
    /// Decode one packet to an image file
    Decode(commands::decode::DecodeArgs),
    /// Run a recorded stream through the full ingest pipeline
    Replay(commands::replay::ReplayArgs),
    /// Write a synthetic test stream
    Synth(commands::synth::SynthArgs),
    /// Print or save the default viewer config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Decode(args) => commands::decode::run(args),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Synth(args) => commands::synth::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
