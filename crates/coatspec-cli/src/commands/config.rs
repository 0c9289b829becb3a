//! Config command - manage the extraction rules file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use coatspec_core::EngineConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the current rules file
    Show,

    /// Initialize a new rules file with the example callout grammar
    Init(InitArgs),

    /// Show the rules file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for the rules file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_rules(),
        ConfigCommand::Init(init_args) => init_rules(init_args),
        ConfigCommand::Path => show_path(),
    }
}

/// Platform rules path: `<config dir>/coatspec/rules.json`.
pub fn default_rules_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coatspec")
        .join("rules.json")
}

fn show_rules() -> anyhow::Result<()> {
    let path = default_rules_path();

    let config = if path.exists() {
        EngineConfig::from_file(&path)?
    } else {
        println!(
            "{} No rules file found, showing the example grammar.",
            style("ℹ").blue()
        );
        EngineConfig::example()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_rules(args: InitArgs) -> anyhow::Result<()> {
    let path = args.output.unwrap_or_else(default_rules_path);

    if path.exists() && !args.force {
        anyhow::bail!(
            "rules file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    EngineConfig::example().save(&path)?;
    println!(
        "{} Wrote example rules to {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    println!("{}", default_rules_path().display());
    Ok(())
}
