//! Full-text and context grouping.
//!
//! Scans the triple block once and pulls out the two pseudo-predicate
//! clause kinds:
//!
//! - `<word:w> <in-context> ?c` records `w` under `context_to_words[?c]`
//! - `?e <in-context> ?c` records `?e` under `context_to_entities[?c]`
//!
//! Everything else is returned as the residual triple list in original
//! order. Each renderer decides for itself how (and whether) to put the
//! removed clauses back.

use crate::ir::{ParsedQuery, Term, TriplePattern, WordPattern};
use indexmap::IndexMap;

/// Per-context groupings of one query. Built once, then read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextGrouping {
    /// Word patterns per context, in clause order
    pub context_to_words: IndexMap<Term, Vec<WordPattern>>,
    /// Entities per context, in clause order
    pub context_to_entities: IndexMap<Term, Vec<Term>>,
    /// `(entity, context)` links in clause order
    links: Vec<(Term, Term)>,
}

impl ContextGrouping {
    /// Split `query.triples` into a grouping and the residual triples.
    pub fn extract(query: &ParsedQuery) -> (Self, Vec<TriplePattern>) {
        let mut grouping = ContextGrouping::default();
        let mut residual = Vec::with_capacity(query.triples.len());

        for triple in &query.triples {
            if let Term::WordLiteral(word) = &triple.subject {
                grouping
                    .context_to_words
                    .entry(triple.object.clone())
                    .or_default()
                    .push(word.clone());
            } else if triple.predicate.is_in_context() {
                grouping
                    .context_to_entities
                    .entry(triple.object.clone())
                    .or_default()
                    .push(triple.subject.clone());
                grouping
                    .links
                    .push((triple.subject.clone(), triple.object.clone()));
            } else {
                residual.push(triple.clone());
            }
        }

        (grouping, residual)
    }

    pub fn is_empty(&self) -> bool {
        self.context_to_words.is_empty() && self.links.is_empty()
    }

    /// Whether the query has any word or context clause at all
    pub fn has_text_search(&self) -> bool {
        !self.is_empty()
    }

    /// `(entity, context)` pairs in the order the clauses appeared
    pub fn links(&self) -> &[(Term, Term)] {
        &self.links
    }

    /// Contexts per entity, entities in first-seen order
    pub fn entity_contexts(&self) -> IndexMap<&Term, Vec<&Term>> {
        let mut pivot: IndexMap<&Term, Vec<&Term>> = IndexMap::new();
        for (entity, context) in &self.links {
            pivot.entry(entity).or_default().push(context);
        }
        pivot
    }

    pub fn words_for(&self, context: &Term) -> Option<&[WordPattern]> {
        self.context_to_words.get(context).map(Vec::as_slice)
    }

    /// Every word pattern across all contexts
    pub fn words(&self) -> impl Iterator<Item = &WordPattern> {
        self.context_to_words.values().flatten()
    }
}
