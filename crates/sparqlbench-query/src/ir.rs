//! Structured form of a canonical query.
//!
//! The parser produces a [`ParsedQuery`]; the grouping extractor and every
//! dialect renderer read it without mutating it. `Display` on each type gives
//! back the canonical surface form, so a query with no text-search clauses
//! renders to the same triples and projection it was parsed from.

use crate::render::surface::SelectBuilder;
use serde::Serialize;
use std::fmt;

/// Local name of the context-membership pseudo-predicate `<in-context>`.
pub const IN_CONTEXT: &str = "in-context";

/// IRI prefix of the full-text pseudo-IRI `<word:…>`.
pub const WORD_PREFIX: &str = "word:";

// ============================================================================
// Terms
// ============================================================================

/// A full-text search pattern taken from a `<word:…>` pseudo-IRI.
///
/// The two properties text-search dialects care about are computed once at
/// construction: a trailing `*` marks a prefix search, and an all-digit
/// pattern is a numeric literal. Both force quoting inside `bif:contains`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WordPattern {
    pattern: String,
    prefix: bool,
    numeric: bool,
}

impl WordPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let prefix = pattern.ends_with('*');
        let numeric = !pattern.is_empty() && pattern.chars().all(|c| c.is_ascii_digit());
        Self {
            pattern,
            prefix,
            numeric,
        }
    }

    /// The raw pattern, including any trailing `*`
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// Pattern as it appears inside a `bif:contains` expression.
    ///
    /// Prefix and numeric patterns are wrapped in single quotes; plain words
    /// are left bare.
    pub fn contains_operand(&self) -> String {
        if self.prefix || self.numeric {
            format!("'{}'", self.pattern)
        } else {
            self.pattern.clone()
        }
    }
}

impl fmt::Display for WordPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// `?name`, stored without the leading `?`
    Variable(String),
    /// `<text>`, stored without the angle brackets
    Iri(String),
    /// `<word:pattern>` full-text pseudo-IRI
    WordLiteral(WordPattern),
    /// Quoted literals, numbers and bare names, kept verbatim
    Literal(String),
}

impl Term {
    pub fn variable(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    pub fn iri(text: impl Into<String>) -> Self {
        Term::Iri(text.into())
    }

    pub fn word(pattern: impl Into<String>) -> Self {
        Term::WordLiteral(WordPattern::new(pattern))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Variable name without the `?`, if this is a variable
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&WordPattern> {
        match self {
            Term::WordLiteral(word) => Some(word),
            _ => None,
        }
    }

    /// True for the `<in-context>` pseudo-predicate
    pub fn is_in_context(&self) -> bool {
        matches!(self, Term::Iri(iri) if iri == IN_CONTEXT)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "?{}", name),
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::WordLiteral(word) => write!(f, "<{}{}>", WORD_PREFIX, word),
            Term::Literal(text) => f.write_str(text),
        }
    }
}

// ============================================================================
// Patterns and filters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl TriplePattern {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// `<word:…> <in-context> ?c`: a full-text condition on a context
    pub fn is_word_clause(&self) -> bool {
        matches!(self.subject, Term::WordLiteral(_))
    }

    /// `?e <in-context> ?c`: an entity occurring in a context
    pub fn is_context_link(&self) -> bool {
        self.predicate.is_in_context() && !self.is_word_clause()
    }

    pub fn terms(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A FILTER clause from the triple block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FilterExpr {
    /// `FILTER(lhs != rhs)`
    NotEqual { lhs: Term, rhs: Term },
    /// Any other filter, kept as the exact source text `FILTER(…)`
    Opaque(String),
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::NotEqual { lhs, rhs } => write!(f, "FILTER({} != {})", lhs, rhs),
            FilterExpr::Opaque(text) => f.write_str(text),
        }
    }
}

// ============================================================================
// Solution modifiers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCondition {
    pub term: Term,
    pub ascending: bool,
}

impl OrderCondition {
    /// Render with `DESC(?x)` (parenthesized) or `DESC ?x` (bare) syntax
    pub fn render(&self, parenthesized: bool) -> String {
        match (self.ascending, parenthesized) {
            (true, _) => self.term.to_string(),
            (false, true) => format!("DESC({})", self.term),
            (false, false) => format!("DESC {}", self.term),
        }
    }
}

/// Position of one modifier clause in the source suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ModifierClause {
    OrderBy,
    Limit,
    Offset,
    /// A run of unrecognized source text, e.g. `GROUP BY ?x HAVING(…)`
    Verbatim(String),
}

static RECOGNIZED_CLAUSES: [ModifierClause; 3] = [
    ModifierClause::OrderBy,
    ModifierClause::Limit,
    ModifierClause::Offset,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub order_by: Option<Vec<OrderCondition>>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Clauses in source order. Recognized clauses missing from this list
    /// render after the listed ones.
    pub clauses: Vec<ModifierClause>,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        self.order_by.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
            && self.trailing().is_none()
    }

    /// Unrecognized modifier text, pieces joined by a space
    pub fn trailing(&self) -> Option<String> {
        let pieces: Vec<&str> = self
            .clauses
            .iter()
            .filter_map(|clause| match clause {
                ModifierClause::Verbatim(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        (!pieces.is_empty()).then(|| pieces.join(" "))
    }

    /// Render the modifier suffix in source order.
    ///
    /// `parenthesized` selects `DESC(?x)` over `DESC ?x` inside ORDER BY.
    pub fn render(&self, parenthesized: bool) -> String {
        let mut layout: Vec<&ModifierClause> = self.clauses.iter().collect();
        for kind in &RECOGNIZED_CLAUSES {
            if !layout.contains(&kind) {
                layout.push(kind);
            }
        }

        layout
            .into_iter()
            .filter_map(|clause| match clause {
                ModifierClause::OrderBy => self.order_by.as_ref().map(|conditions| {
                    let keys = conditions
                        .iter()
                        .map(|c| c.render(parenthesized))
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!("ORDER BY {}", keys)
                }),
                ModifierClause::Limit => self.limit.map(|n| format!("LIMIT {}", n)),
                ModifierClause::Offset => self.offset.map(|n| format!("OFFSET {}", n)),
                ModifierClause::Verbatim(text) => Some(text.clone()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

// ============================================================================
// Query
// ============================================================================

/// A parsed canonical query.
///
/// Every variable in the projection, filters and modifiers is expected to
/// occur in some triple; this is preserved, not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    pub distinct: bool,
    /// Projected variable names without `?`; empty for `SELECT *`
    pub projection: Vec<String>,
    pub triples: Vec<TriplePattern>,
    pub filters: Vec<FilterExpr>,
    pub modifiers: Modifiers,
}

impl ParsedQuery {
    /// Distinct variable names in order of first appearance across the
    /// projection and the triple block
    pub fn variables(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let from_triples = self
            .triples
            .iter()
            .flat_map(|t| t.terms())
            .filter_map(Term::as_variable);
        for name in self.projection.iter().map(String::as_str).chain(from_triples) {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = self
            .triples
            .iter()
            .map(ToString::to_string)
            .chain(self.filters.iter().map(ToString::to_string));
        let rendered = SelectBuilder::new(self.distinct, &self.projection)
            .clauses(clauses)
            .modifiers(self.modifiers.render(true))
            .build();
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("berlin", false, false ; "plain word")]
    #[test_case("berl*", true, false ; "prefix search")]
    #[test_case("1969", false, true ; "numeric")]
    #[test_case("19*", true, false ; "numeric prefix is a prefix")]
    fn test_word_pattern_flags(pattern: &str, prefix: bool, numeric: bool) {
        let word = WordPattern::new(pattern);
        assert_eq!(word.is_prefix(), prefix);
        assert_eq!(word.is_numeric(), numeric);
    }

    #[test]
    fn test_contains_operand_quoting() {
        assert_eq!(WordPattern::new("berlin").contains_operand(), "berlin");
        assert_eq!(WordPattern::new("berlin*").contains_operand(), "'berlin*'");
        assert_eq!(WordPattern::new("1969").contains_operand(), "'1969'");
    }

    #[test]
    fn test_term_display() {
        assert_eq!(Term::variable("x").to_string(), "?x");
        assert_eq!(Term::iri("City").to_string(), "<City>");
        assert_eq!(Term::word("ber*").to_string(), "<word:ber*>");
        assert_eq!(Term::Literal("\"x\"@en".into()).to_string(), "\"x\"@en");
    }

    #[test]
    fn test_clause_classification() {
        let word = TriplePattern::new(Term::word("a"), Term::iri(IN_CONTEXT), Term::variable("c"));
        let link = TriplePattern::new(Term::variable("x"), Term::iri(IN_CONTEXT), Term::variable("c"));
        let plain = TriplePattern::new(Term::variable("x"), Term::iri("is-a"), Term::iri("City"));

        assert!(word.is_word_clause() && !word.is_context_link());
        assert!(link.is_context_link() && !link.is_word_clause());
        assert!(!plain.is_word_clause() && !plain.is_context_link());
    }

    #[test]
    fn test_modifiers_render_styles() {
        let modifiers = Modifiers {
            order_by: Some(vec![
                OrderCondition {
                    term: Term::variable("n"),
                    ascending: false,
                },
                OrderCondition {
                    term: Term::variable("x"),
                    ascending: true,
                },
            ]),
            limit: Some(10),
            offset: Some(20),
            clauses: Vec::new(),
        };

        assert_eq!(modifiers.render(true), "ORDER BY DESC(?n) ?x LIMIT 10 OFFSET 20");
        assert_eq!(modifiers.render(false), "ORDER BY DESC ?n ?x LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_modifiers_render_in_source_order() {
        let modifiers = Modifiers {
            limit: Some(2),
            clauses: vec![
                ModifierClause::Verbatim("GROUP BY ?x".into()),
                ModifierClause::Limit,
            ],
            ..Default::default()
        };

        assert_eq!(modifiers.render(true), "GROUP BY ?x LIMIT 2");
        assert_eq!(modifiers.trailing().as_deref(), Some("GROUP BY ?x"));
        assert!(!modifiers.is_empty());
    }

    #[test]
    fn test_variables_first_seen_order() {
        let query = ParsedQuery {
            projection: vec!["y".into()],
            triples: vec![
                TriplePattern::new(Term::variable("x"), Term::iri("p"), Term::variable("y")),
                TriplePattern::new(Term::variable("z"), Term::iri("q"), Term::variable("x")),
            ],
            ..Default::default()
        };

        assert_eq!(query.variables(), vec!["y", "x", "z"]);
    }
}
