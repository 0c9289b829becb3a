//! Process command - extract records from a single input file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use coatspec_core::{
    BatchOutput, BatchSummary, ExtractionEngine, FieldValue, OutputRecord, RawRecord,
    RecordExtractor,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file: JSON Lines of raw records, or plain text with --plain
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Treat each input line as bare raw text instead of a JSON record
    #[arg(long)]
    plain: bool,

    /// Print the batch summary to stderr
    #[arg(long)]
    summary: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array
    Json,
    /// One JSON record per line
    Jsonl,
    /// CSV with one column per output field
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn run(args: ProcessArgs, rules_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let engine = super::build_engine(rules_path)?;

    let records = read_records(&args.input, args.plain)?;
    info!("read {} records from {}", records.len(), args.input.display());

    let output = engine.extract_batch(&records);
    let content = render_records(&output.records, &engine, args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!("wrote output to {}", path.display());
        }
        None => print!("{content}"),
    }

    if args.summary {
        print_summary(&output.summary);
    }

    debug!("processed in {:?}", start.elapsed());
    Ok(())
}

/// Read raw records from a file: JSON Lines by default, one bare callout
/// per line with `plain`.
pub fn read_records(path: &Path, plain: bool) -> anyhow::Result<Vec<RawRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let source_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input")
        .to_string();

    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if plain {
            records.push(RawRecord {
                source_id: source_id.clone(),
                page_number: (index + 1) as u32,
                coordinates: [0.0; 4],
                raw_text: line.to_string(),
            });
        } else {
            // A malformed record is fatal to that record, not the batch.
            match serde_json::from_str::<RawRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("{}:{}: skipping invalid record: {}", path.display(), index + 1, e),
            }
        }
    }

    Ok(records)
}

/// Render output records in the requested format.
pub fn render_records(
    records: &[OutputRecord],
    engine: &ExtractionEngine,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut content = serde_json::to_string_pretty(records)?;
            content.push('\n');
            Ok(content)
        }
        OutputFormat::Jsonl => {
            let mut content = String::new();
            for record in records {
                content.push_str(&serde_json::to_string(record)?);
                content.push('\n');
            }
            Ok(content)
        }
        OutputFormat::Csv => render_csv(records, engine),
        OutputFormat::Text => Ok(render_text(records, engine)),
    }
}

fn render_csv(records: &[OutputRecord], engine: &ExtractionEngine) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["source_id".to_string(), "page_number".to_string()];
    header.extend(engine.field_names().iter().cloned());
    wtr.write_record(&header)?;

    for record in records {
        let mut row = vec![record.source_id.clone(), record.page_number.to_string()];
        for name in engine.field_names() {
            // CSV has no null; an empty cell stands in for one here only.
            let cell = match record.fields.get(name) {
                Some(FieldValue::Text(s)) => s.clone(),
                Some(FieldValue::List(items)) => items.join(","),
                Some(FieldValue::Null) | None => String::new(),
            };
            row.push(cell);
        }
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn render_text(records: &[OutputRecord], engine: &ExtractionEngine) -> String {
    let mut output = String::new();

    for record in records {
        output.push_str(&format!(
            "{} (page {})\n",
            record.source_id, record.page_number
        ));
        for name in engine.field_names() {
            let value = match record.fields.get(name) {
                Some(FieldValue::Text(s)) => s.clone(),
                Some(FieldValue::List(items)) => items.join(", "),
                Some(FieldValue::Null) | None => "-".to_string(),
            };
            output.push_str(&format!("  {name}: {value}\n"));
        }
        output.push('\n');
    }

    output
}

/// Print the data-quality summary to stderr.
pub fn print_summary(summary: &BatchSummary) {
    eprintln!(
        "{} {} records in, {} out ({} duplicates discarded)",
        style("✓").green(),
        summary.input_records,
        summary.output_records,
        summary.duplicates_discarded
    );
    eprintln!(
        "   {} fully resolved, {} partially null, {} fully null",
        style(summary.fully_resolved).green(),
        style(summary.partially_null).yellow(),
        style(summary.fully_null).red()
    );
}

/// Summary accumulation across files for the batch command.
pub fn accumulate(total: &mut BatchSummary, summary: &BatchSummary) {
    total.input_records += summary.input_records;
    total.output_records += summary.output_records;
    total.fully_resolved += summary.fully_resolved;
    total.partially_null += summary.partially_null;
    total.fully_null += summary.fully_null;
    total.duplicates_discarded += summary.duplicates_discarded;
}

/// Process one already-read batch; shared with the batch command.
pub fn extract_file(
    engine: &ExtractionEngine,
    path: &Path,
    plain: bool,
) -> anyhow::Result<BatchOutput> {
    let records = read_records(path, plain)?;
    Ok(engine.extract_batch(&records))
}
