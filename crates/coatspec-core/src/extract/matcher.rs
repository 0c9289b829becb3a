//! Ordered pattern matching anchored at a byte offset.

use regex::Regex;

use crate::error::ConfigError;
use crate::models::config::PatternRule;

/// One pattern in the span of text it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Byte offset of the whole match.
    pub start: usize,
    /// Byte offset one past the whole match; the next chained segment's
    /// window starts here.
    pub end: usize,
    /// Extracted value: the requested capture group, or the whole match.
    pub value: String,
}

/// A compiled pattern rule.
#[derive(Debug)]
struct CompiledRule {
    regex: Regex,
    group: Option<usize>,
}

/// An ordered rule set; the first rule that matches wins.
///
/// Priority is declaration order, deliberately not "most specific": rule
/// authors control precedence by ordering, and evaluation stays
/// deterministic.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile a rule list, validating patterns and capture group indices.
    pub fn compile(rules: &[PatternRule], segment: &str) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptySegmentRules {
                segment: segment.to_string(),
            });
        }

        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.pattern.is_empty() {
                return Err(ConfigError::EmptyPattern {
                    segment: segment.to_string(),
                });
            }

            let regex = Regex::new(&rule.pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: rule.pattern.clone(),
                source,
            })?;

            if let Some(group) = rule.group {
                if group >= regex.captures_len() {
                    return Err(ConfigError::InvalidGroup {
                        pattern: rule.pattern.clone(),
                        group,
                    });
                }
            }

            compiled.push(CompiledRule {
                regex,
                group: rule.group,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// First match at or after `start`, trying rules in declared order.
    ///
    /// Searching begins at the supplied offset rather than the start of the
    /// text, so chained matchers advance left-to-right without rescanning.
    /// A rule whose requested capture group did not participate in its
    /// match is treated as a non-match and the next rule is tried.
    pub fn first_match(&self, text: &str, start: usize) -> Option<MatchSpan> {
        if start > text.len() {
            return None;
        }

        for rule in &self.rules {
            let Some(caps) = rule.regex.captures_at(text, start) else {
                continue;
            };
            let whole = caps.get(0).expect("group 0 always participates");

            let value = match rule.group {
                None => whole.as_str(),
                Some(group) => match caps.get(group) {
                    Some(m) => m.as_str(),
                    None => continue,
                },
            };

            return Some(MatchSpan {
                start: whole.start(),
                end: whole.end(),
                value: value.to_string(),
            });
        }

        None
    }
}
