//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use anyhow::Context;

use coatspec_core::{EngineConfig, ExtractionEngine};

/// Load the rules file and compile the engine.
///
/// Falls back to the platform config path when no explicit path is given;
/// a missing file points the user at `coatspec config init`.
pub fn build_engine(rules_path: Option<&str>) -> anyhow::Result<ExtractionEngine> {
    let path = match rules_path {
        Some(p) => Path::new(p).to_path_buf(),
        None => config::default_rules_path(),
    };

    if !path.exists() {
        anyhow::bail!(
            "no rules file at {} - run `coatspec config init` or pass --rules",
            path.display()
        );
    }

    let config = EngineConfig::from_file(&path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;

    ExtractionEngine::from_config(config)
        .with_context(|| format!("invalid rules file {}", path.display()))
}
