//! RDF-3X renderer.
//!
//! RDF-3X stores word occurrences as ordinary triples, so text clauses pass
//! through unchanged. Differences from canonical syntax:
//!
//! - `FILTER(a != b)` must be written `FILTER(!(a=b))`
//! - ORDER BY keys are unparenthesized: `DESC ?x`
//! - no prefix search and no OFFSET

use crate::error::RenderError;
use crate::ir::FilterExpr;
use crate::render::surface::{distinct_for_text_search, SelectBuilder};
use crate::render::{Dialect, DialectRenderer, TranslationInput};

pub struct Rdf3xRenderer;

impl DialectRenderer for Rdf3xRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Rdf3x
    }

    fn check(&self, input: &TranslationInput<'_>) -> Result<(), RenderError> {
        let prefix_word = input
            .query
            .triples
            .iter()
            .flat_map(|t| t.terms())
            .find(|term| term.as_word().is_some_and(|w| w.is_prefix()));
        if let Some(term) = prefix_word {
            return Err(RenderError::inexpressible(
                Dialect::Rdf3x,
                format!("prefix search {} cannot be expressed", term),
            ));
        }

        if let Some(offset) = input.query.modifiers.offset {
            return Err(RenderError::inexpressible(
                Dialect::Rdf3x,
                format!("OFFSET {} is not supported", offset),
            ));
        }

        Ok(())
    }

    fn render(&self, input: &TranslationInput<'_>) -> String {
        let query = input.query;

        let triples = query.triples.iter().map(ToString::to_string);
        let filters = query.filters.iter().map(|filter| match filter {
            FilterExpr::NotEqual { lhs, rhs } => format!("FILTER(!({}={}))", lhs, rhs),
            FilterExpr::Opaque(text) => text.clone(),
        });

        SelectBuilder::new(
            distinct_for_text_search(query, input.grouping),
            &query.projection,
        )
        .clauses(triples.chain(filters))
        .modifiers(query.modifiers.render(false))
        .build()
    }
}
