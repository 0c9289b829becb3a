//! The extraction engine: configuration compilation and the batch pipeline.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::compile::{compile_record, dedup_records, summarize};
use crate::enrich::LookupEnricher;
use crate::error::ConfigError;
use crate::extract::SegmentExtractor;
use crate::models::config::{DedupPolicy, EngineConfig};
use crate::models::record::{BatchOutput, OutputRecord, RawRecord};
use crate::normalize::MisreadNormalizer;

/// Trait for record extraction engines.
pub trait RecordExtractor {
    /// Extract one structured record from a raw record.
    fn extract_record(&self, raw: &RawRecord) -> OutputRecord;

    /// Extract, deduplicate, and summarize a whole batch.
    fn extract_batch(&self, batch: &[RawRecord]) -> BatchOutput;
}

/// Compiled, immutable extraction engine.
///
/// `from_config` compiles every pattern and cross-validates references up
/// front, so configuration mistakes fail at startup rather than mid-batch.
/// The engine holds no mutable state and is shared by reference across
/// worker threads.
#[derive(Debug)]
pub struct ExtractionEngine {
    normalizer: MisreadNormalizer,
    extractor: SegmentExtractor,
    enricher: LookupEnricher,
    dedup: DedupPolicy,
    field_names: Vec<String>,
    segment_fields: Vec<String>,
}

impl ExtractionEngine {
    /// Compile a declarative configuration into a ready engine.
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        let normalizer = MisreadNormalizer::compile(&config.misread_rules)?;
        let extractor = SegmentExtractor::compile(&config.segments)?;
        let enricher = LookupEnricher::new(config.lookups);

        let mut field_names = Vec::new();
        let mut segment_fields = Vec::new();
        for segment in extractor.segments() {
            segment_fields.push(segment.name.clone());
            field_names.push(segment.name.clone());
            if let Some(lookup) = &segment.lookup {
                if !enricher.has_table(&lookup.table) {
                    return Err(ConfigError::UnknownLookupTable {
                        segment: segment.name.clone(),
                        table: lookup.table.clone(),
                    });
                }
                field_names.push(lookup.output.clone());
            }
        }

        for field in &config.dedup.key {
            if !field_names.contains(field) {
                return Err(ConfigError::UnknownDedupField {
                    field: field.clone(),
                });
            }
        }

        info!(
            segments = segment_fields.len(),
            misread_rules = config.misread_rules.len(),
            "compiled extraction engine"
        );

        Ok(Self {
            normalizer,
            extractor,
            enricher,
            dedup: config.dedup,
            field_names,
            segment_fields,
        })
    }

    /// Output field names in declaration order (each segment followed by
    /// its enrichment field), for columnar writers.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Segment field names only, excluding enrichment descriptions.
    pub fn segment_fields(&self) -> &[String] {
        &self.segment_fields
    }

    fn process_one(&self, raw: &RawRecord) -> OutputRecord {
        let normalized = self.normalizer.normalize(&raw.raw_text);
        let segments = self.extractor.extract(&normalized);
        let record = compile_record(raw, &segments, self.extractor.segments(), &self.enricher);

        debug!(
            source_id = %raw.source_id,
            page = raw.page_number,
            resolved = record.resolved_count(&self.segment_fields),
            "extracted record"
        );

        record
    }
}

impl RecordExtractor for ExtractionEngine {
    fn extract_record(&self, raw: &RawRecord) -> OutputRecord {
        self.process_one(raw)
    }

    /// The per-record stage is data-parallel: records share no mutable
    /// state and carry no ordering dependency, so they fan out across the
    /// rayon pool. Deduplication is a barrier and runs after the full
    /// batch is materialized.
    fn extract_batch(&self, batch: &[RawRecord]) -> BatchOutput {
        let compiled: Vec<OutputRecord> =
            batch.par_iter().map(|raw| self.process_one(raw)).collect();

        let mut summary = summarize(&compiled, &self.segment_fields, 0, 0);
        let (records, discarded) = dedup_records(compiled, &self.dedup);
        summary.output_records = records.len();
        summary.duplicates_discarded = discarded;

        info!(
            input = summary.input_records,
            output = summary.output_records,
            full = summary.fully_resolved,
            partial = summary.partially_null,
            empty = summary.fully_null,
            duplicates = summary.duplicates_discarded,
            "processed batch"
        );

        BatchOutput { records, summary }
    }
}
