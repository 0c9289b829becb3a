//! Record compilation: field assembly, deduplication, and batch summary.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::enrich::LookupEnricher;
use crate::extract::CompiledSegment;
use crate::models::config::{DedupPolicy, TieBreak};
use crate::models::record::{
    BatchSummary, Completeness, FieldValue, OutputRecord, RawRecord, Segment, SegmentValue,
};

/// Assemble one output record from a raw record's extracted segments.
///
/// Null-policy: a segment field is null iff its segment is null; an
/// enrichment field is null iff its segment is null or its code is
/// unmapped. Nulls are never coerced to empty strings.
pub fn compile_record(
    raw: &RawRecord,
    segments: &[Segment],
    compiled: &[CompiledSegment],
    enricher: &LookupEnricher,
) -> OutputRecord {
    let mut fields = BTreeMap::new();

    for (segment, def) in segments.iter().zip(compiled) {
        if let Some(lookup) = &def.lookup {
            let description = match &segment.value {
                SegmentValue::Text(code) => enricher
                    .describe(&lookup.table, code)
                    .map(|d| FieldValue::Text(d.to_string())),
                _ => None,
            };
            fields.insert(lookup.output.clone(), description.unwrap_or(FieldValue::Null));
        }
        fields.insert(segment.name.clone(), segment.value.clone().into());
    }

    OutputRecord {
        source_id: raw.source_id.clone(),
        page_number: raw.page_number,
        coordinates: raw.coordinates,
        fields,
    }
}

/// Deduplicate a compiled batch by the configured key.
///
/// Pure function over the full batch: grouping needs every record
/// materialized, so this stage is a barrier after the parallel per-record
/// work. Output preserves scan order with each group's representative at
/// the group's first-seen position. Records with any null key component
/// bypass dedup; merging unrelated records that merely failed key
/// extraction the same way would be wrong.
pub fn dedup_records(records: Vec<OutputRecord>, policy: &DedupPolicy) -> (Vec<OutputRecord>, usize) {
    if policy.key.is_empty() {
        return (records, 0);
    }

    let mut kept: Vec<Option<OutputRecord>> = Vec::with_capacity(records.len());
    let mut representatives: HashMap<Vec<String>, usize> = HashMap::new();
    let mut discarded = 0;

    for record in records {
        let key: Option<Vec<String>> = policy
            .key
            .iter()
            .map(|field| {
                record.fields.get(field).and_then(|v| match v {
                    FieldValue::Text(s) => Some(s.clone()),
                    FieldValue::List(items) => Some(items.join(",")),
                    FieldValue::Null => None,
                })
            })
            .collect();

        let Some(key) = key else {
            kept.push(Some(record));
            continue;
        };

        match representatives.get(&key) {
            None => {
                representatives.insert(key, kept.len());
                kept.push(Some(record));
            }
            Some(&slot) => {
                discarded += 1;
                if policy.tie_break == TieBreak::MostComplete {
                    let incumbent = kept[slot].as_ref().expect("representative slot is filled");
                    if non_null_count(&record) > non_null_count(incumbent) {
                        kept[slot] = Some(record);
                    }
                }
                // FirstSeen: the incumbent stays.
            }
        }
    }

    (kept.into_iter().flatten().collect(), discarded)
}

fn non_null_count(record: &OutputRecord) -> usize {
    record.fields.values().filter(|v| !v.is_null()).count()
}

/// Classify completeness of every compiled record and total up the batch.
///
/// Completeness is counted over the pre-dedup batch (`records`), so the
/// summary reflects raw extraction quality rather than the survivors.
pub fn summarize(
    records: &[OutputRecord],
    segment_fields: &[String],
    output_records: usize,
    duplicates_discarded: usize,
) -> BatchSummary {
    let mut summary = BatchSummary {
        input_records: records.len(),
        output_records,
        duplicates_discarded,
        ..BatchSummary::default()
    };

    for record in records {
        match record.completeness(segment_fields) {
            Completeness::Full => summary.fully_resolved += 1,
            Completeness::Partial => summary.partially_null += 1,
            Completeness::Empty => summary.fully_null += 1,
        }
    }

    debug!(
        full = summary.fully_resolved,
        partial = summary.partially_null,
        empty = summary.fully_null,
        "classified batch completeness"
    );

    summary
}
