//! CLI application for paint-spec callout extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, process};

/// Paint-spec callout extraction - structured records from OCR'd drawing text
#[derive(Parser)]
#[command(name = "coatspec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the extraction rules file
    #[arg(short, long, global = true)]
    rules: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single input file
    Process(process::ProcessArgs),

    /// Process multiple input files
    Batch(batch::BatchArgs),

    /// Manage the extraction rules file
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Process(args) => process::run(args, cli.rules.as_deref()),
        Commands::Batch(args) => batch::run(args, cli.rules.as_deref()),
        Commands::Config(args) => config::run(args),
    }
}
