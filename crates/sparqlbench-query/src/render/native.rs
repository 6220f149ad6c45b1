//! Renderer for the engine with built-in context search.
//!
//! The native engine takes all words of one context in a single clause:
//! `?c <in-context> berlin 1969*`. Entity links stay as ordinary triples.

use crate::ir::{WordPattern, IN_CONTEXT};
use crate::render::surface::{canonical_filters, SelectBuilder};
use crate::render::{Dialect, DialectRenderer, TranslationInput};

pub struct NativeRenderer;

impl DialectRenderer for NativeRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Native
    }

    fn render(&self, input: &TranslationInput<'_>) -> String {
        let query = input.query;

        let mut clauses: Vec<String> = query
            .triples
            .iter()
            .filter(|t| !t.is_word_clause())
            .map(ToString::to_string)
            .collect();

        for (context, words) in &input.grouping.context_to_words {
            let words = words
                .iter()
                .map(WordPattern::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            clauses.push(format!("{} <{}> {}", context, IN_CONTEXT, words));
        }
        clauses.extend(canonical_filters(query));

        SelectBuilder::new(query.distinct, &query.projection)
            .clauses(clauses)
            .modifiers(query.modifiers.render(true))
            .build()
    }
}
