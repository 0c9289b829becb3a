//! Property tests over synthetic callouts with known boundaries.

use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest::test_runner::Config;

use coatspec_core::compile::dedup_records;
use coatspec_core::models::config::{
    DedupPolicy, EngineConfig, MisreadRule, PatternRule, SegmentDef, TieBreak,
};
use coatspec_core::models::record::{FieldValue, OutputRecord, RawRecord};
use coatspec_core::{ExtractionEngine, MisreadNormalizer, RecordExtractor, SegmentExtractor};

fn two_segment_extractor() -> SegmentExtractor {
    SegmentExtractor::compile(&[
        SegmentDef::new("head", vec![PatternRule::new(r"[a-d]{3}[0-9]{2}")]),
        SegmentDef::new("tail", vec![PatternRule::new(r"[w-z]{2}")]),
    ])
    .unwrap()
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    // The chained window must start exactly at the previous segment's
    // matched end; an off-by-one would misplace or truncate the tail.
    #[test]
    fn next_window_starts_at_previous_end(
        head in "[a-d]{3}[0-9]{2}",
        tail in "[w-z]{2}",
        trailing in "[0-9]{0,4}"
    ) {
        let text = format!("{head}{tail}{trailing}");
        let segments = two_segment_extractor().extract(&text);

        prop_assert_eq!(segments[0].end, Some(head.len()));
        prop_assert_eq!(segments[1].start, Some(head.len()));
        prop_assert_eq!(segments[1].end, Some(head.len() + tail.len()));
    }

    // Normalizing already-normalized text must change nothing.
    #[test]
    fn normalization_is_idempotent(text in "[ -~]{0,40}") {
        let normalizer = MisreadNormalizer::compile(&[MisreadRule {
            variants: "il|!{/\\".to_string(),
            canonical: '1',
            after: "(?i)jdmf".to_string(),
        }])
        .unwrap();

        let once = normalizer.normalize(&text);
        let twice = normalizer.normalize(&once);
        prop_assert_eq!(once, twice);
    }

    // A misread immediately after the context behaves exactly like the
    // canonical character already in place. The suffix alphabet excludes
    // everything that could form a second context.
    #[test]
    fn misread_matches_canonical(suffix in "[0-9a-h]{0,12}") {
        let normalizer = MisreadNormalizer::compile(&[MisreadRule {
            variants: "il".to_string(),
            canonical: '1',
            after: "jdmf".to_string(),
        }])
        .unwrap();

        let misread = format!("jdmfi{suffix}");
        let canonical = format!("jdmf1{suffix}");
        prop_assert_eq!(normalizer.normalize(&misread), canonical);
    }

    // Arbitrary input never panics the engine, and every configured
    // field appears on the output record, null or not.
    #[test]
    fn every_field_present_on_arbitrary_input(text in "[ -~]{0,60}") {
        let engine = ExtractionEngine::from_config(EngineConfig::example()).unwrap();
        let record = RawRecord::from_text("prop", text);
        // Extraction must not panic and must keep the null policy: a
        // field is either absent from no record or properly null.
        let output = engine.extract_record(&record);
        for name in engine.field_names() {
            prop_assert!(output.fields.contains_key(name));
        }
    }

    // Dedup must pick the same representative however often it runs.
    #[test]
    fn dedup_is_deterministic(
        keys in proptest::collection::vec(0u8..4, 1..20),
        nulls in proptest::collection::vec(any::<bool>(), 1..20)
    ) {
        let records: Vec<OutputRecord> = keys
            .iter()
            .zip(nulls.iter().cycle())
            .enumerate()
            .map(|(i, (key, null))| {
                let mut fields = BTreeMap::new();
                fields.insert("part".to_string(), FieldValue::Text(format!("p{key}")));
                fields.insert(
                    "color".to_string(),
                    if *null {
                        FieldValue::Null
                    } else {
                        FieldValue::Text("zz".to_string())
                    },
                );
                OutputRecord {
                    source_id: format!("rec-{i}"),
                    page_number: 0,
                    coordinates: [0.0; 4],
                    fields,
                }
            })
            .collect();

        for tie_break in [TieBreak::FirstSeen, TieBreak::MostComplete] {
            let policy = DedupPolicy {
                key: vec!["part".to_string()],
                tie_break,
            };
            let (first, first_discarded) = dedup_records(records.clone(), &policy);
            let (second, second_discarded) = dedup_records(records.clone(), &policy);

            let first_ids: Vec<&str> =
                first.iter().map(|r| r.source_id.as_str()).collect();
            let second_ids: Vec<&str> =
                second.iter().map(|r| r.source_id.as_str()).collect();
            prop_assert_eq!(first_ids, second_ids);
            prop_assert_eq!(first_discarded, second_discarded);
        }
    }
}
