//! Error types for the coatspec-core library.

use thiserror::Error;

/// Main error type for the coatspec library.
#[derive(Error, Debug)]
pub enum CoatspecError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised while compiling an engine configuration.
///
/// All of these are fatal at startup. Per-record extraction outcomes
/// (misses, short-circuited segments) are represented as data on the
/// output record, never as errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A misread rule has an empty variant class.
    #[error("misread rule for '{canonical}' has no variant characters")]
    EmptyVariants { canonical: char },

    /// A misread rule has no context pattern. Blind full-text replacement
    /// is not supported; every substitution must be anchored to a context.
    #[error("misread rule for '{canonical}' has an empty context pattern")]
    EmptyContext { canonical: char },

    /// A pattern rule has an empty pattern string.
    #[error("empty pattern in segment '{segment}'")]
    EmptyPattern { segment: String },

    /// A pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A rule requests a capture group its pattern does not have.
    #[error("pattern '{pattern}' has no capture group {group}")]
    InvalidGroup { pattern: String, group: usize },

    /// The segment list is empty.
    #[error("configuration declares no segments")]
    NoSegments,

    /// Two segments share a name.
    #[error("duplicate segment name '{name}'")]
    DuplicateSegment { name: String },

    /// A segment declares no pattern rules.
    #[error("segment '{segment}' has no pattern rules")]
    EmptySegmentRules { segment: String },

    /// A segment references a lookup table that is not configured.
    #[error("segment '{segment}' references unknown lookup table '{table}'")]
    UnknownLookupTable { segment: String, table: String },

    /// A repeated segment declares a lookup; descriptions attach to
    /// scalar codes only.
    #[error("repeated segment '{segment}' cannot declare a lookup")]
    RepeatLookup { segment: String },

    /// The dedup key names a field no segment or lookup produces.
    #[error("dedup key references unknown field '{field}'")]
    UnknownDedupField { field: String },
}

/// Result type for the coatspec library.
pub type Result<T> = std::result::Result<T, CoatspecError>;
