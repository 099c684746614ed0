//! KSL translator CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{ConfigCommand, HistoryCommand, ReplayCommand, SignsCommand, TranslateCommand};

/// KSL translator CLI.
///
/// Drives the Kenyan Sign Language recognition core from the command line:
///   - Replay recorded hand landmark frames through the pipeline
///   - Compose English/Swahili sentences from sign tokens
///   - List the supported vocabulary
///   - Inspect the saved translation history
///
/// Configuration is stored in ~/.ksl/translator/config.yaml
#[derive(Parser)]
#[command(name = "ksl")]
#[command(about = "KSL translator CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.ksl/translator/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Replay recorded landmark frames through the pipeline
    Replay(ReplayCommand),
    /// Show or add to the translation history
    History(HistoryCommand),
    /// Compose a sentence from sign tokens
    Translate(TranslateCommand),
    /// List supported signs and phrases
    Signs(SignsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Replay(cmd) => cmd.run(&cli).await,
        Commands::History(cmd) => cmd.run(&cli).await,
        Commands::Translate(cmd) => cmd.run(&cli).await,
        Commands::Signs(cmd) => cmd.run(&cli).await,
    }
}
