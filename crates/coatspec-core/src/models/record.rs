//! Record models flowing through the extraction pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One raw text block as produced by an upstream OCR stage.
///
/// Immutable input unit; the engine never modifies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Identifier of the source document or drawing.
    pub source_id: String,

    /// Page the text block was detected on.
    #[serde(default)]
    pub page_number: u32,

    /// Bounding box of the text block: [x0, y0, x1, y1].
    #[serde(default)]
    pub coordinates: [f32; 4],

    /// Raw recognized text, misreads and all.
    pub raw_text: String,
}

impl RawRecord {
    /// Build a record from bare text, for sources without block metadata.
    pub fn from_text(source_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            page_number: 0,
            coordinates: [0.0; 4],
            raw_text: raw_text.into(),
        }
    }
}

/// Value extracted for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentValue {
    /// Nothing extracted.
    Null,
    /// A single matched token.
    Text(String),
    /// Successive matches of a repeated segment, in match order.
    List(Vec<String>),
}

impl SegmentValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SegmentValue::Null)
    }
}

/// Why a segment holds the value it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    /// The rule set matched.
    Matched,
    /// The rule set matched nothing in the segment's window.
    Miss,
    /// An upstream dependent segment was null; this one was never searched.
    ShortCircuit,
}

/// One extraction step's output.
///
/// `start`/`end` are byte offsets into the normalized text and are present
/// exactly when the value is non-null. Spans across a record are
/// non-overlapping and monotonically non-decreasing.
#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub value: SegmentValue,
    pub status: SegmentStatus,
}

impl Segment {
    pub fn matched(name: impl Into<String>, start: usize, end: usize, value: SegmentValue) -> Self {
        Self {
            name: name.into(),
            start: Some(start),
            end: Some(end),
            value,
            status: SegmentStatus::Matched,
        }
    }

    pub fn missed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: None,
            end: None,
            value: SegmentValue::Null,
            status: SegmentStatus::Miss,
        }
    }

    pub fn short_circuited(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: None,
            end: None,
            value: SegmentValue::Null,
            status: SegmentStatus::ShortCircuit,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

/// A code resolved against a static lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedValue {
    /// The extracted code.
    pub code: String,
    /// Human-readable description, `None` when the code is unmapped.
    pub description: Option<String>,
}

/// One output field. `Null` is a real value, never coerced to an empty
/// string: downstream consumers distinguish "not found" from "found but
/// empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The scalar text value, if this field holds one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<SegmentValue> for FieldValue {
    fn from(value: SegmentValue) -> Self {
        match value {
            SegmentValue::Null => FieldValue::Null,
            SegmentValue::Text(s) => FieldValue::Text(s),
            SegmentValue::List(items) => FieldValue::List(items),
        }
    }
}

/// How much of a record resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// Every segment field is non-null.
    Full,
    /// Some segment fields are null.
    Partial,
    /// Every segment field is null.
    Empty,
}

/// Structured output for one raw record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    pub source_id: String,
    pub page_number: u32,
    pub coordinates: [f32; 4],

    /// All segment fields plus all enrichment description fields,
    /// serialized at the top level of the record.
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl OutputRecord {
    /// Number of non-null fields among the given names.
    pub fn resolved_count(&self, names: &[String]) -> usize {
        names
            .iter()
            .filter(|n| self.fields.get(*n).is_some_and(|f| !f.is_null()))
            .count()
    }

    /// Classify completeness over the given segment field names.
    pub fn completeness(&self, segment_fields: &[String]) -> Completeness {
        let resolved = self.resolved_count(segment_fields);
        if resolved == segment_fields.len() {
            Completeness::Full
        } else if resolved == 0 {
            Completeness::Empty
        } else {
            Completeness::Partial
        }
    }
}

/// Data-quality accounting for one processed batch.
///
/// Completeness counts are taken over compiled records before
/// deduplication, so the summary reflects raw batch quality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Records received.
    pub input_records: usize,
    /// Records emitted after deduplication.
    pub output_records: usize,
    /// Records with every segment field resolved.
    pub fully_resolved: usize,
    /// Records with a mix of resolved and null segment fields.
    pub partially_null: usize,
    /// Records where no segment matched at all.
    pub fully_null: usize,
    /// Records dropped by deduplication.
    pub duplicates_discarded: usize,
}

/// Final result of processing one batch.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub records: Vec<OutputRecord>,
    pub summary: BatchSummary,
}
