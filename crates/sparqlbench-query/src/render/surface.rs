//! SPARQL-shaped surface assembly shared by the SELECT-based dialects.

use crate::ir::{FilterExpr, ParsedQuery};
use crate::transform::ContextGrouping;

/// Builds `SELECT [DISTINCT] vars WHERE { c1 . c2 … } modifiers`.
pub(crate) struct SelectBuilder<'a> {
    distinct: bool,
    projection: &'a [String],
    clauses: Vec<String>,
    modifiers: String,
}

impl<'a> SelectBuilder<'a> {
    pub(crate) fn new(distinct: bool, projection: &'a [String]) -> Self {
        Self {
            distinct,
            projection,
            clauses: Vec::new(),
            modifiers: String::new(),
        }
    }

    pub(crate) fn clauses(mut self, clauses: impl IntoIterator<Item = String>) -> Self {
        self.clauses.extend(clauses);
        self
    }

    pub(crate) fn modifiers(mut self, modifiers: String) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub(crate) fn build(self) -> String {
        let mut out = String::from("SELECT");
        if self.distinct {
            out.push_str(" DISTINCT");
        }
        if self.projection.is_empty() {
            out.push_str(" *");
        }
        for var in self.projection {
            out.push_str(" ?");
            out.push_str(var);
        }

        if self.clauses.is_empty() {
            out.push_str(" WHERE { }");
        } else {
            out.push_str(" WHERE { ");
            out.push_str(&self.clauses.join(" . "));
            out.push_str(" }");
        }

        if !self.modifiers.is_empty() {
            out.push(' ');
            out.push_str(&self.modifiers);
        }
        out
    }
}

/// DISTINCT must be present whenever text clauses exist: unions of
/// per-word matches multiply result rows. Never added twice.
pub(crate) fn distinct_for_text_search(query: &ParsedQuery, grouping: &ContextGrouping) -> bool {
    query.distinct || grouping.has_text_search()
}

/// Filters in canonical form
pub(crate) fn canonical_filters(query: &ParsedQuery) -> impl Iterator<Item = String> + '_ {
    query.filters.iter().map(FilterExpr::to_string)
}
