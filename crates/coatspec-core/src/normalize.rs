//! Misread normalization: contextual OCR error substitution.
//!
//! OCR stages confuse visually similar glyphs (`l` for `1`, `O` for `0`).
//! Normalization rewrites those misreads to their canonical characters
//! before any pattern matching runs, but only in configured contexts:
//! a substitution applies to a variant character immediately following a
//! match of the rule's context pattern. Blind full-text replacement would
//! corrupt unrelated characters and is not supported.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::ConfigError;
use crate::models::config::MisreadRule;

lazy_static! {
    /// Characters OCR stages commonly produce in place of each digit.
    static ref DIGIT_LOOKALIKES: HashMap<char, &'static str> = {
        let mut m = HashMap::new();
        m.insert('0', "oOQD");
        m.insert('1', "il|!{/\\");
        m.insert('2', "zZ");
        m.insert('5', "sS");
        m.insert('8', "B");
        m
    };
}

/// Known lookalike class for a digit, if one is catalogued.
pub fn digit_lookalikes(digit: char) -> Option<&'static str> {
    DIGIT_LOOKALIKES.get(&digit).copied()
}

/// Build a misread rule canonicalizing lookalikes of `digit` after the
/// given context pattern. Returns `None` for digits with no catalogued
/// lookalike class.
pub fn digit_rule(after: impl Into<String>, digit: char) -> Option<MisreadRule> {
    digit_lookalikes(digit).map(|variants| MisreadRule {
        variants: variants.to_string(),
        canonical: digit,
        after: after.into(),
    })
}

/// One compiled substitution: context capture plus variant class.
#[derive(Debug)]
struct CompiledMisread {
    regex: Regex,
    canonical: char,
}

/// Applies the configured misread substitutions to raw text.
///
/// Pure function over text; rules apply in declared order, each as one
/// left-to-right non-overlapping pass. Normalization is idempotent:
/// canonical characters are never in scope for rewriting unless a rule
/// maps them to themselves.
#[derive(Debug)]
pub struct MisreadNormalizer {
    rules: Vec<CompiledMisread>,
}

impl MisreadNormalizer {
    /// Compile the rule table. Fails on an empty variant class, an empty
    /// context, or an invalid context pattern.
    pub fn compile(rules: &[MisreadRule]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if rule.variants.is_empty() {
                return Err(ConfigError::EmptyVariants {
                    canonical: rule.canonical,
                });
            }
            if rule.after.is_empty() {
                return Err(ConfigError::EmptyContext {
                    canonical: rule.canonical,
                });
            }

            let class: String = rule.variants.chars().map(class_escape).collect();
            let pattern = format!("(?P<__ctx>{})(?P<__ch>[{}])", rule.after, class);
            let regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: rule.after.clone(),
                source,
            })?;

            compiled.push(CompiledMisread {
                regex,
                canonical: rule.canonical,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// Apply all substitutions, producing the normalized text.
    pub fn normalize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule
                .regex
                .replace_all(&out, |caps: &Captures| {
                    let mut replaced = caps["__ctx"].to_string();
                    replaced.push(rule.canonical);
                    replaced
                })
                .into_owned();
        }
        out
    }
}

/// Escape a character for use inside a regex character class.
fn class_escape(c: char) -> String {
    if c.is_alphanumeric() {
        c.to_string()
    } else {
        format!("\\{}", c)
    }
}
