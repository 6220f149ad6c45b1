//! Per-line translation into every registered dialect.

use crate::error::ParseError;
use crate::ir::ParsedQuery;
use crate::render::{Dialect, DialectRegistry, TranslationInput, TranslationOutcome};
use crate::syntax::parse_line;
use crate::transform::ContextGrouping;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// All dialect outcomes for one input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineTranslation {
    pub id: String,
    pub query: ParsedQuery,
    /// One outcome per registered dialect, in registry order
    pub outcomes: IndexMap<Dialect, TranslationOutcome>,
}

impl LineTranslation {
    pub fn outcome(&self, dialect: Dialect) -> Option<&TranslationOutcome> {
        self.outcomes.get(&dialect)
    }
}

/// Parses lines and runs every registered renderer over them.
///
/// A rejection by one dialect never affects the others. A parse failure
/// means no dialect is attempted for that line.
#[derive(Default)]
pub struct Transpiler {
    registry: DialectRegistry,
}

impl Transpiler {
    pub fn new(registry: DialectRegistry) -> Self {
        Self { registry }
    }

    /// Only the built-in renderers for `dialects`
    pub fn with_dialects(dialects: &[Dialect]) -> Self {
        Self::new(DialectRegistry::only(dialects))
    }

    pub fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    /// Translate an already parsed query
    pub fn translate_query(&self, query: &ParsedQuery) -> IndexMap<Dialect, TranslationOutcome> {
        let (grouping, residual) = ContextGrouping::extract(query);
        let input = TranslationInput {
            query,
            grouping: &grouping,
            residual: &residual,
        };

        self.registry
            .iter()
            .map(|renderer| (renderer.dialect(), renderer.translate(&input)))
            .collect()
    }

    /// Parse and translate one `id<TAB>query` line
    pub fn translate_line(&self, line: &str) -> Result<LineTranslation, ParseError> {
        let parsed = parse_line(line).map_err(|err| {
            debug!("skipping line: {}", err);
            err
        })?;
        let outcomes = self.translate_query(&parsed.query);

        Ok(LineTranslation {
            id: parsed.id,
            query: parsed.query,
            outcomes,
        })
    }

    /// One result per line, in input order
    pub fn translate_batch<'a, I>(&self, lines: I) -> Vec<Result<LineTranslation, ParseError>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .map(|line| self.translate_line(line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_line_covers_every_dialect() {
        let line = Transpiler::default()
            .translate_line("q1\tSELECT ?x WHERE { ?x <is-a> <City> . } LIMIT 5")
            .unwrap();

        assert_eq!(line.id, "q1");
        let dialects: Vec<_> = line.outcomes.keys().copied().collect();
        assert_eq!(dialects, Dialect::ALL.to_vec());
        assert!(line.outcomes.values().all(|o| !o.is_inexpressible()));
    }

    #[test]
    fn test_with_dialects_restricts_outcomes() {
        let line = Transpiler::with_dialects(&[Dialect::Rdf3x])
            .translate_line("q\tSELECT ?x WHERE { ?x <p> ?y }")
            .unwrap();

        assert_eq!(line.outcomes.len(), 1);
        assert!(line.outcome(Dialect::Rdf3x).is_some());
        assert!(line.outcome(Dialect::Native).is_none());
    }

    #[test]
    fn test_translate_batch_keeps_order_and_failures() {
        let results = Transpiler::default().translate_batch([
            "a\tSELECT ?x WHERE { ?x <p> ?y }",
            "no tab here",
            "c\tSELECT ?x WHERE { ?x <q> ?y }",
        ]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id, "a");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().id, "c");
    }

    #[test]
    fn test_line_translation_serializes_dialect_keys() {
        let line = Transpiler::with_dialects(&[Dialect::BifContainsIncremental])
            .translate_line("q\tSELECT ?x WHERE { ?x <p> ?y }")
            .unwrap();
        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(
            json["outcomes"]["bif-contains-inc"]["outcome"],
            serde_json::json!("rewritten")
        );
    }
}
