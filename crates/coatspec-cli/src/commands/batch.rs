//! Batch processing command for multiple input files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use coatspec_core::BatchSummary;

use super::process::{self, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "jsonl")]
    format: OutputFormat,

    /// Treat input lines as bare raw text instead of JSON records
    #[arg(long)]
    plain: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    summary: Option<BatchSummary>,
    error: Option<String>,
}

pub fn run(args: BatchArgs, rules_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let engine = super::build_engine(rules_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?.filter_map(|r| r.ok()).collect();
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    let mut totals = BatchSummary::default();

    for path in files {
        match process_one_file(&engine, &path, &args) {
            Ok(summary) => {
                process::accumulate(&mut totals, &summary);
                results.push(FileResult {
                    path,
                    summary: Some(summary),
                    error: None,
                });
            }
            Err(e) => {
                let message = e.to_string();
                if !args.continue_on_error {
                    pb.abandon();
                    anyhow::bail!("Processing {} failed: {}", path.display(), message);
                }
                warn!("failed to process {}: {}", path.display(), message);
                results.push(FileResult {
                    path,
                    summary: None,
                    error: Some(message),
                });
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    process::print_summary(&totals);

    if failed > 0 {
        println!();
        println!("{}", style("Failed files:").red());
        for result in results.iter().filter(|r| r.error.is_some()) {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_one_file(
    engine: &coatspec_core::ExtractionEngine,
    path: &PathBuf,
    args: &BatchArgs,
) -> anyhow::Result<BatchSummary> {
    let output = process::extract_file(engine, path, args.plain)?;

    if let Some(ref output_dir) = args.output_dir {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("records");
        let out_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));

        let content = process::render_records(&output.records, engine, args.format)?;
        fs::write(&out_path, content)?;
        debug!("wrote output to {}", out_path.display());
    }

    Ok(output.summary)
}

fn write_summary(path: &PathBuf, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "input_records",
        "output_records",
        "fully_resolved",
        "partially_null",
        "fully_null",
        "duplicates_discarded",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(summary) = &result.summary {
            wtr.write_record([
                filename,
                "success",
                &summary.input_records.to_string(),
                &summary.output_records.to_string(),
                &summary.fully_resolved.to_string(),
                &summary.partially_null.to_string(),
                &summary.fully_null.to_string(),
                &summary.duplicates_discarded.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
