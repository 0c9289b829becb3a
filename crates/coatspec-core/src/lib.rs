//! Core library for paint-spec callout extraction.
//!
//! This crate provides:
//! - Contextual OCR misread normalization
//! - Ordered, offset-anchored pattern matching (first matching rule wins)
//! - Chained segment extraction with dependency short-circuiting
//! - Static lookup enrichment (code -> description)
//! - Record compilation with strict null policy, batch deduplication, and
//!   data-quality summaries
//!
//! All behavior is driven by a declarative [`EngineConfig`]; see
//! [`EngineConfig::example`] for the paint-callout grammar the tests use.

pub mod compile;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;

pub use engine::{ExtractionEngine, RecordExtractor};
pub use enrich::LookupEnricher;
pub use error::{CoatspecError, ConfigError, Result};
pub use extract::matcher::{MatchSpan, RuleSet};
pub use extract::SegmentExtractor;
pub use models::config::{
    DedupPolicy, EngineConfig, MisreadRule, OffsetPolicy, PatternRule, SegmentDef, SegmentLookup,
    TieBreak,
};
pub use models::record::{
    BatchOutput, BatchSummary, Completeness, EnrichedValue, FieldValue, OutputRecord, RawRecord,
    Segment, SegmentStatus, SegmentValue,
};
pub use normalize::MisreadNormalizer;
