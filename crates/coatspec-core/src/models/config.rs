//! Declarative configuration for the extraction engine.
//!
//! Everything that governs extraction behavior lives here as plain data:
//! misread substitution rules, segment definitions with their pattern rule
//! sets and offset policies, static lookup tables, and the deduplication
//! policy. Pattern authors extend these files without touching the
//! extraction logic.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered misread substitution rules, applied before any matching.
    pub misread_rules: Vec<MisreadRule>,

    /// Ordered segment definitions; order defines the dependency chain.
    pub segments: Vec<SegmentDef>,

    /// Static lookup tables: table name -> code -> description.
    pub lookups: HashMap<String, HashMap<String, String>>,

    /// Batch deduplication policy.
    pub dedup: DedupPolicy,
}

/// One contextual OCR-misread substitution.
///
/// Every character in `variants` is rewritten to `canonical` when it occurs
/// immediately after a match of the `after` pattern. There is deliberately
/// no uncontextualized form: a blind full-text replacement would corrupt
/// unrelated characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MisreadRule {
    /// Characters the OCR stage is known to produce in this position.
    pub variants: String,

    /// The character they canonicalize to.
    pub canonical: char,

    /// Context pattern; substitution applies only to a variant character
    /// immediately following a match of this pattern.
    pub after: String,
}

/// One regular-expression rule inside a segment's rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    /// Regex source. Character-class alternation and bounded quantifiers
    /// are the usual tools for tolerating residual misreads.
    pub pattern: String,

    /// Capture group holding the value; the whole match when absent.
    /// The chain always advances past the whole match either way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            group: None,
        }
    }
}

/// Where a segment's search window starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetPolicy {
    /// At the previous segment's matched end plus a fixed gap.
    Chained { gap: usize },

    /// Immediately after the first match of an anchor pattern at or after
    /// the cursor. An unmatched anchor is a miss for the segment.
    AfterPattern { pattern: String },

    /// At the cursor high-water mark, wherever extraction has reached.
    Anywhere,
}

impl Default for OffsetPolicy {
    fn default() -> Self {
        OffsetPolicy::Chained { gap: 0 }
    }
}

/// One segment of the extraction chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDef {
    /// Output field name. Must be unique across the configuration.
    pub name: String,

    /// Ordered rule set; the first rule that matches wins.
    pub rules: Vec<PatternRule>,

    /// Search window policy.
    #[serde(default)]
    pub offset: OffsetPolicy,

    /// Extract even when an upstream segment is null. Dependent segments
    /// (the default) go null once the chain breaks.
    #[serde(default)]
    pub independent: bool,

    /// Collect successive matches into a list instead of a single token.
    #[serde(default)]
    pub repeat: bool,

    /// Resolve the matched code against a lookup table into an extra
    /// description field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<SegmentLookup>,
}

impl SegmentDef {
    pub fn new(name: impl Into<String>, rules: Vec<PatternRule>) -> Self {
        Self {
            name: name.into(),
            rules,
            offset: OffsetPolicy::default(),
            independent: false,
            repeat: false,
            lookup: None,
        }
    }
}

/// Enrichment declaration on a segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentLookup {
    /// Name of the lookup table in `EngineConfig::lookups`.
    pub table: String,

    /// Name of the description field on the output record.
    pub output: String,
}

/// How ties between records sharing a dedup key are broken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The earliest record in scan order wins.
    #[default]
    FirstSeen,
    /// The record with the most non-null fields wins; scan order breaks
    /// ties.
    MostComplete,
}

/// Batch deduplication policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupPolicy {
    /// Output field names forming the dedup key. Empty disables dedup.
    pub key: Vec<String>,

    /// Tie-break rule for records sharing a key.
    pub tie_break: TieBreak,
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Example configuration: the paint-spec callout grammar used on
    /// scanned drawing callouts like `jdmf14zza3(x3,x5)`.
    ///
    /// Chain: standard text, topcoat color code (with description lookup),
    /// temperature class, physical property class, then a parenthesized
    /// list of additional requirement codes.
    pub fn example() -> Self {
        let mut colors = HashMap::new();
        colors.insert("zz".to_string(), "Black primer".to_string());
        colors.insert("a1".to_string(), "Gloss white".to_string());
        colors.insert("b2".to_string(), "Matte gray".to_string());

        let mut lookups = HashMap::new();
        lookups.insert("topcoat_colors".to_string(), colors);

        Self {
            misread_rules: vec![MisreadRule {
                variants: "il|!{/\\".to_string(),
                canonical: '1',
                after: "(?i)jdmf".to_string(),
            }],
            segments: vec![
                SegmentDef::new("standard_text", vec![PatternRule::new(r"(?i)jdmf\d{2}")]),
                SegmentDef {
                    lookup: Some(SegmentLookup {
                        table: "topcoat_colors".to_string(),
                        output: "topcoat_color_desc".to_string(),
                    }),
                    ..SegmentDef::new(
                        "topcoat_color_code",
                        vec![PatternRule::new(r"[a-z][a-z0-9]")],
                    )
                },
                SegmentDef::new("temp_class", vec![PatternRule::new(r"[a-z]")]),
                SegmentDef::new("physical_property_class", vec![PatternRule::new(r"[0-9]")]),
                SegmentDef {
                    offset: OffsetPolicy::AfterPattern {
                        pattern: r"\(".to_string(),
                    },
                    independent: true,
                    repeat: true,
                    ..SegmentDef::new(
                        "additional_requirements",
                        vec![PatternRule::new(r"[a-z][0-9]+")],
                    )
                },
            ],
            lookups,
            dedup: DedupPolicy {
                key: vec!["standard_text".to_string()],
                tie_break: TieBreak::FirstSeen,
            },
        }
    }
}
