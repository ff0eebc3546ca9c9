//! nettone CLI - run, drive and inspect the network-controlled synth.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nettone")]
#[command(author, version, about = "Network-controlled polyphonic synth", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for control datagrams and play to the audio device
    Run(commands::run::RunArgs),

    /// Apply commands and render a fixed duration to a WAV file
    Render(commands::render::RenderArgs),

    /// Send a control command to a running synth
    Send(commands::send::SendArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),

    /// Show the effective configuration
    Config(commands::config::ConfigArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    // Logs go to stderr so command output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => commands::run::run(args, config),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Send(args) => commands::send::run(args, config),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
