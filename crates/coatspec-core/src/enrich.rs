//! Lookup enrichment: resolving extracted codes to descriptions.

use std::collections::HashMap;

use crate::models::record::EnrichedValue;

/// Static code-to-description tables, loaded once at engine build and
/// read-only thereafter.
///
/// Unmapped codes are routine for evolving standards, so a failed lookup
/// yields a null description rather than an error.
#[derive(Debug)]
pub struct LookupEnricher {
    tables: HashMap<String, HashMap<String, String>>,
}

impl LookupEnricher {
    pub fn new(tables: HashMap<String, HashMap<String, String>>) -> Self {
        Self { tables }
    }

    /// Whether a table is configured.
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Description for a code, if the table maps it.
    pub fn describe(&self, table: &str, code: &str) -> Option<&str> {
        self.tables.get(table)?.get(code).map(String::as_str)
    }

    /// Resolve a code into an enriched value.
    pub fn enrich(&self, table: &str, code: &str) -> EnrichedValue {
        EnrichedValue {
            code: code.to_string(),
            description: self.describe(table, code).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enricher() -> LookupEnricher {
        let mut colors = HashMap::new();
        colors.insert("zz".to_string(), "Black primer".to_string());
        let mut tables = HashMap::new();
        tables.insert("topcoat_colors".to_string(), colors);
        LookupEnricher::new(tables)
    }

    #[test]
    fn mapped_code_resolves() {
        let e = enricher();
        assert_eq!(e.describe("topcoat_colors", "zz"), Some("Black primer"));
    }

    #[test]
    fn unmapped_code_yields_null_description() {
        let e = enricher();
        let enriched = e.enrich("topcoat_colors", "h2");
        assert_eq!(enriched.code, "h2");
        assert_eq!(enriched.description, None);
    }

    #[test]
    fn missing_table_yields_null_description() {
        let e = enricher();
        assert_eq!(e.describe("standards", "jdmf14"), None);
    }
}
