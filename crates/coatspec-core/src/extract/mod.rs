//! Chained segment extraction.
//!
//! A text field decomposes into an ordered sequence of sub-tokens
//! ("segments"), each located relative to the previous one's match span.
//! The extractor walks the configured segment definitions left-to-right
//! with a byte cursor, so a callout like `jdmf14zza3(x3,x5)` yields its
//! standard text, color code, temperature class, physical property class,
//! and requirement list in one pass.

pub mod matcher;

use std::collections::HashSet;

use regex::Regex;

use crate::error::ConfigError;
use crate::models::config::{OffsetPolicy, SegmentDef, SegmentLookup};
use crate::models::record::{Segment, SegmentValue};

use matcher::RuleSet;

/// Compiled window policy.
#[derive(Debug)]
enum CompiledOffset {
    Chained { gap: usize },
    AfterPattern { anchor: Regex },
    Anywhere,
}

/// One compiled segment definition.
#[derive(Debug)]
pub struct CompiledSegment {
    pub name: String,
    rules: RuleSet,
    offset: CompiledOffset,
    pub independent: bool,
    pub repeat: bool,
    pub lookup: Option<SegmentLookup>,
}

/// Extracts the ordered segment sequence from normalized text.
#[derive(Debug)]
pub struct SegmentExtractor {
    segments: Vec<CompiledSegment>,
}

impl SegmentExtractor {
    /// Compile the segment definitions, validating structure up front.
    pub fn compile(defs: &[SegmentDef]) -> Result<Self, ConfigError> {
        if defs.is_empty() {
            return Err(ConfigError::NoSegments);
        }

        let mut names = HashSet::new();
        let mut segments = Vec::with_capacity(defs.len());

        for def in defs {
            if !names.insert(def.name.clone()) {
                return Err(ConfigError::DuplicateSegment {
                    name: def.name.clone(),
                });
            }
            if let Some(lookup) = &def.lookup {
                if def.repeat {
                    return Err(ConfigError::RepeatLookup {
                        segment: def.name.clone(),
                    });
                }
                if !names.insert(lookup.output.clone()) {
                    return Err(ConfigError::DuplicateSegment {
                        name: lookup.output.clone(),
                    });
                }
            }

            let rules = RuleSet::compile(&def.rules, &def.name)?;
            let offset = match &def.offset {
                OffsetPolicy::Chained { gap } => CompiledOffset::Chained { gap: *gap },
                OffsetPolicy::AfterPattern { pattern } => {
                    if pattern.is_empty() {
                        return Err(ConfigError::EmptyPattern {
                            segment: def.name.clone(),
                        });
                    }
                    let anchor =
                        Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                            pattern: pattern.clone(),
                            source,
                        })?;
                    CompiledOffset::AfterPattern { anchor }
                }
                OffsetPolicy::Anywhere => CompiledOffset::Anywhere,
            };

            segments.push(CompiledSegment {
                name: def.name.clone(),
                rules,
                offset,
                independent: def.independent,
                repeat: def.repeat,
                lookup: def.lookup.clone(),
            });
        }

        Ok(Self { segments })
    }

    /// Compiled segments, in declaration order.
    pub fn segments(&self) -> &[CompiledSegment] {
        &self.segments
    }

    /// Extract all segments from normalized text.
    ///
    /// The cursor is a high-water mark over matched ends, which keeps the
    /// produced spans non-overlapping and monotonically non-decreasing.
    /// Once a dependent segment goes null the chain stays broken: later
    /// dependent segments short-circuit to null without being searched,
    /// while segments marked independent still extract.
    pub fn extract(&self, text: &str) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.segments.len());
        let mut cursor = 0usize;
        let mut chain_alive = true;

        for seg in &self.segments {
            if !seg.independent && !chain_alive {
                out.push(Segment::short_circuited(&seg.name));
                continue;
            }

            let window_start = match &seg.offset {
                CompiledOffset::Chained { gap } => Some(cursor + gap),
                CompiledOffset::Anywhere => Some(cursor),
                CompiledOffset::AfterPattern { anchor } => {
                    if cursor > text.len() {
                        None
                    } else {
                        anchor.find_at(text, cursor).map(|m| m.end())
                    }
                }
            };

            let extracted = window_start.and_then(|start| {
                if seg.repeat {
                    collect_repeats(&seg.rules, text, start)
                } else {
                    seg.rules
                        .first_match(text, start)
                        .map(|m| (m.start, m.end, SegmentValue::Text(m.value)))
                }
            });

            match extracted {
                Some((start, end, value)) => {
                    cursor = cursor.max(end);
                    out.push(Segment::matched(&seg.name, start, end, value));
                }
                None => {
                    out.push(Segment::missed(&seg.name));
                    if !seg.independent {
                        chain_alive = false;
                    }
                }
            }
        }

        out
    }
}

/// Collect successive matches of a repeated segment, each search starting
/// at the previous match's end. Zero matches is a miss, not an empty list.
fn collect_repeats(
    rules: &RuleSet,
    text: &str,
    window_start: usize,
) -> Option<(usize, usize, SegmentValue)> {
    let mut items = Vec::new();
    let mut first_start = None;
    let mut last_end = window_start;
    let mut pos = window_start;

    while let Some(m) = rules.first_match(text, pos) {
        if first_start.is_none() {
            first_start = Some(m.start);
        }
        last_end = m.end;
        items.push(m.value);
        // Guard against zero-width matches pinning the scan in place.
        pos = if m.end > pos { m.end } else { pos + 1 };
    }

    first_start.map(|start| (start, last_end, SegmentValue::List(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::PatternRule;
    use crate::models::record::SegmentStatus;
    use pretty_assertions::assert_eq;

    fn extractor(defs: Vec<SegmentDef>) -> SegmentExtractor {
        SegmentExtractor::compile(&defs).unwrap()
    }

    fn chain() -> SegmentExtractor {
        extractor(vec![
            SegmentDef::new("standard_text", vec![PatternRule::new(r"(?i)jdmf\d{2}")]),
            SegmentDef::new("topcoat_color_code", vec![PatternRule::new(r"[a-z][a-z0-9]")]),
            SegmentDef::new("temp_class", vec![PatternRule::new(r"[a-z]")]),
            SegmentDef::new("physical_property_class", vec![PatternRule::new(r"[0-9]")]),
        ])
    }

    fn values(segments: &[Segment]) -> Vec<Option<&str>> {
        segments
            .iter()
            .map(|s| match &s.value {
                SegmentValue::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn chained_windows_start_at_prior_end() {
        let segments = chain().extract("jdmf14zza3");

        assert_eq!(
            values(&segments),
            vec![Some("jdmf14"), Some("zz"), Some("a"), Some("3")]
        );
        assert_eq!(segments[0].end, Some(6));
        assert_eq!(segments[1].start, Some(6));
        assert_eq!(segments[1].end, Some(8));
        assert_eq!(segments[2].start, Some(8));
        assert_eq!(segments[3].start, Some(9));
    }

    #[test]
    fn spans_are_monotonically_non_decreasing() {
        let segments = chain().extract("jdmf14zza3");
        let mut prev_end = 0;
        for seg in &segments {
            let (start, end) = (seg.start.unwrap(), seg.end.unwrap());
            assert!(start >= prev_end);
            assert!(end >= start);
            prev_end = end;
        }
    }

    #[test]
    fn miss_short_circuits_dependents() {
        let segments = chain().extract("jdmf14");

        assert_eq!(segments[0].status, SegmentStatus::Matched);
        assert_eq!(segments[1].status, SegmentStatus::Miss);
        assert_eq!(segments[2].status, SegmentStatus::ShortCircuit);
        assert_eq!(segments[3].status, SegmentStatus::ShortCircuit);
        assert!(segments[2].is_null());
    }

    #[test]
    fn independent_segment_survives_chain_break() {
        let ex = extractor(vec![
            SegmentDef::new("code", vec![PatternRule::new(r"jdmf\d{2}")]),
            SegmentDef::new("color", vec![PatternRule::new(r"zz")]),
            SegmentDef {
                offset: OffsetPolicy::AfterPattern {
                    pattern: r"\(".to_string(),
                },
                independent: true,
                repeat: true,
                ..SegmentDef::new("reqs", vec![PatternRule::new(r"x\d")])
            },
        ]);

        // "zz" never appears: color misses, but the independent trailing
        // list still extracts.
        let segments = ex.extract("jdmf14ab(x3,x5)");
        assert_eq!(segments[1].status, SegmentStatus::Miss);
        assert_eq!(segments[2].status, SegmentStatus::Matched);
        assert_eq!(
            segments[2].value,
            SegmentValue::List(vec!["x3".to_string(), "x5".to_string()])
        );
    }

    #[test]
    fn repeat_collects_successive_matches_in_order() {
        let ex = extractor(vec![SegmentDef {
            offset: OffsetPolicy::AfterPattern {
                pattern: r"\(".to_string(),
            },
            repeat: true,
            ..SegmentDef::new("reqs", vec![PatternRule::new(r"[a-z][0-9]+")])
        }]);

        let segments = ex.extract("jdmf14zza3(x3,x5,y12)");
        assert_eq!(
            segments[0].value,
            SegmentValue::List(vec!["x3".to_string(), "x5".to_string(), "y12".to_string()])
        );
    }

    #[test]
    fn repeat_with_no_matches_is_a_miss_not_an_empty_list() {
        let ex = extractor(vec![SegmentDef {
            repeat: true,
            ..SegmentDef::new("reqs", vec![PatternRule::new(r"x\d")])
        }]);

        let segments = ex.extract("jdmf14");
        assert_eq!(segments[0].status, SegmentStatus::Miss);
        assert_eq!(segments[0].value, SegmentValue::Null);
    }

    #[test]
    fn unmatched_anchor_is_a_miss() {
        let ex = extractor(vec![SegmentDef {
            offset: OffsetPolicy::AfterPattern {
                pattern: r"\(".to_string(),
            },
            repeat: true,
            ..SegmentDef::new("reqs", vec![PatternRule::new(r"x\d")])
        }]);

        let segments = ex.extract("jdmf14zza3");
        assert_eq!(segments[0].status, SegmentStatus::Miss);
    }

    #[test]
    fn chained_gap_skips_fixed_width() {
        let ex = extractor(vec![
            SegmentDef::new("code", vec![PatternRule::new(r"\d{2}")]),
            SegmentDef {
                offset: OffsetPolicy::Chained { gap: 1 },
                ..SegmentDef::new("suffix", vec![PatternRule::new(r"[a-z]+")])
            },
        ]);

        // The dash between code and suffix is skipped by the gap; the
        // suffix window starts past it.
        let segments = ex.extract("14-abc");
        assert_eq!(segments[1].start, Some(3));
        assert_eq!(segments[1].value, SegmentValue::Text("abc".to_string()));
    }

    #[test]
    fn gap_beyond_text_end_is_a_miss() {
        let ex = extractor(vec![
            SegmentDef::new("code", vec![PatternRule::new(r"\d{2}")]),
            SegmentDef {
                offset: OffsetPolicy::Chained { gap: 10 },
                ..SegmentDef::new("suffix", vec![PatternRule::new(r"[a-z]+")])
            },
        ]);

        let segments = ex.extract("14abc");
        assert_eq!(segments[1].status, SegmentStatus::Miss);
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = SegmentExtractor::compile(&[
            SegmentDef::new("code", vec![PatternRule::new(r"\d")]),
            SegmentDef::new("code", vec![PatternRule::new(r"\d")]),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSegment { .. }));
    }

    #[test]
    fn lookup_output_colliding_with_segment_name_rejected() {
        let err = SegmentExtractor::compile(&[
            SegmentDef::new("desc", vec![PatternRule::new(r"\d")]),
            SegmentDef {
                lookup: Some(SegmentLookup {
                    table: "t".to_string(),
                    output: "desc".to_string(),
                }),
                ..SegmentDef::new("code", vec![PatternRule::new(r"\d")])
            },
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSegment { .. }));
    }

    #[test]
    fn repeat_with_lookup_rejected() {
        let err = SegmentExtractor::compile(&[SegmentDef {
            repeat: true,
            lookup: Some(SegmentLookup {
                table: "t".to_string(),
                output: "desc".to_string(),
            }),
            ..SegmentDef::new("reqs", vec![PatternRule::new(r"x\d")])
        }])
        .unwrap_err();
        assert!(matches!(err, ConfigError::RepeatLookup { .. }));
    }

    #[test]
    fn empty_segment_list_rejected() {
        let err = SegmentExtractor::compile(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::NoSegments));
    }
}
