//! Virtuoso `bif:contains` renderers.
//!
//! Both variants replace the word clauses of a context by a text relation
//! plus one `bif:contains` match:
//!
//! ```text
//! <node> <text> ?textK . ?textK bif:contains "berlin and 'wall*'"
//! ```
//!
//! The incremental variant hangs the text off the context itself. The plain
//! variant has no context nodes, so it pivots each word group onto the entity
//! linked to the context.

use crate::error::RenderError;
use crate::ir::{ParsedQuery, Term, WordPattern};
use crate::render::surface::{canonical_filters, distinct_for_text_search, SelectBuilder};
use crate::render::{Dialect, DialectRenderer, TranslationInput};
use indexmap::IndexMap;
use std::collections::HashSet;

const TEXT_PREDICATE: &str = "<text>";

/// `"w1 and w2 …"`, with prefix and numeric words single-quoted
fn contains_expression(words: &[WordPattern]) -> String {
    let operands = words
        .iter()
        .map(WordPattern::contains_operand)
        .collect::<Vec<_>>()
        .join(" and ");
    format!("\"{}\"", operands)
}

/// Hands out text variable names no query variable already uses
struct TextVariables<'q> {
    taken: HashSet<&'q str>,
    synthesized: HashSet<String>,
}

impl<'q> TextVariables<'q> {
    fn new(query: &'q ParsedQuery) -> Self {
        Self {
            taken: query.variables().into_iter().collect(),
            synthesized: HashSet::new(),
        }
    }

    fn claim(&mut self, name: &str) -> bool {
        !self.taken.contains(name) && self.synthesized.insert(name.to_string())
    }

    /// `base`, or `base_1`, `base_2`, … if that name is in use
    fn named(&mut self, base: String) -> String {
        let mut name = base.clone();
        let mut bump = 0usize;
        while !self.claim(&name) {
            bump += 1;
            name = format!("{}_{}", base, bump);
        }
        name
    }

    /// The next free `textN`, counting up from `*next`
    fn indexed(&mut self, next: &mut usize) -> String {
        loop {
            let name = format!("text{}", next);
            *next += 1;
            if self.claim(&name) {
                return name;
            }
        }
    }
}

fn push_text_match(clauses: &mut Vec<String>, node: &Term, text_var: &str, words: &[WordPattern]) {
    clauses.push(format!("{} {} ?{}", node, TEXT_PREDICATE, text_var));
    clauses.push(format!("?{} bif:contains {}", text_var, contains_expression(words)));
}

// ============================================================================
// Incremental
// ============================================================================

pub struct BifContainsIncrementalRenderer;

impl DialectRenderer for BifContainsIncrementalRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::BifContainsIncremental
    }

    fn render(&self, input: &TranslationInput<'_>) -> String {
        let query = input.query;

        let mut clauses: Vec<String> = query
            .triples
            .iter()
            .filter(|t| !t.is_word_clause())
            .map(ToString::to_string)
            .collect();

        let mut names = TextVariables::new(query);
        for (index, (context, words)) in input.grouping.context_to_words.iter().enumerate() {
            let text_var = match context.as_variable() {
                Some(name) => names.named(format!("text{}", name)),
                None => names.named(format!("text{}", index)),
            };
            push_text_match(&mut clauses, context, &text_var, words);
        }
        clauses.extend(canonical_filters(query));

        SelectBuilder::new(
            distinct_for_text_search(query, input.grouping),
            &query.projection,
        )
        .clauses(clauses)
        .modifiers(query.modifiers.render(true))
        .build()
    }
}

// ============================================================================
// Entity-pivoted
// ============================================================================

pub struct BifContainsRenderer;

impl BifContainsRenderer {
    fn reject(reason: String) -> RenderError {
        RenderError::inexpressible(Dialect::BifContains, reason)
    }
}

impl DialectRenderer for BifContainsRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::BifContains
    }

    fn check(&self, input: &TranslationInput<'_>) -> Result<(), RenderError> {
        let grouping = input.grouping;

        let mut owner: IndexMap<&Term, &Term> = IndexMap::new();
        for (entity, context) in grouping.links() {
            if !entity.is_variable() {
                return Err(Self::reject(format!(
                    "<in-context> subject {} is not a variable",
                    entity
                )));
            }
            match owner.get(context) {
                Some(first) if *first != entity => {
                    return Err(Self::reject(format!(
                        "context {} is shared by more than one entity ({} and {})",
                        context, first, entity
                    )));
                }
                _ => {
                    owner.insert(context, entity);
                }
            }
            if grouping.words_for(context).is_none() {
                return Err(Self::reject(format!(
                    "context {} of {} has no word to match",
                    context, entity
                )));
            }
        }

        if let Some(context) = grouping
            .context_to_words
            .keys()
            .find(|c| !owner.contains_key(c))
        {
            return Err(Self::reject(format!(
                "words in context {} are not linked to any entity",
                context
            )));
        }

        Ok(())
    }

    fn render(&self, input: &TranslationInput<'_>) -> String {
        let query = input.query;
        let grouping = input.grouping;

        let mut clauses: Vec<String> = input.residual.iter().map(ToString::to_string).collect();

        let mut names = TextVariables::new(query);
        let mut next_text = 0usize;
        for (entity, contexts) in grouping.entity_contexts() {
            for context in contexts {
                let words = grouping.words_for(context).unwrap_or_default();
                let text_var = names.indexed(&mut next_text);
                push_text_match(&mut clauses, entity, &text_var, words);
            }
        }
        clauses.extend(canonical_filters(query));

        SelectBuilder::new(
            distinct_for_text_search(query, grouping),
            &query.projection,
        )
        .clauses(clauses)
        .modifiers(query.modifiers.render(true))
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TranslationOutcome;
    use crate::syntax::parse_query;
    use crate::transform::ContextGrouping;
    use test_case::test_case;

    fn translate(renderer: &dyn DialectRenderer, input: &str) -> TranslationOutcome {
        let query = parse_query(input).unwrap();
        let (grouping, residual) = ContextGrouping::extract(&query);
        renderer.translate(&TranslationInput {
            query: &query,
            grouping: &grouping,
            residual: &residual,
        })
    }

    // ========================================================================
    // Incremental
    // ========================================================================

    #[test]
    fn test_incremental_prefix_word_quoted() {
        let outcome = translate(
            &BifContainsIncrementalRenderer,
            "SELECT ?x WHERE { <word:berlin*> <in-context> ?c . ?x <in-context> ?c . }",
        );
        insta::assert_snapshot!(
            outcome.rewritten().unwrap(),
            @r#"SELECT DISTINCT ?x WHERE { ?x <in-context> ?c . ?c <text> ?textc . ?textc bif:contains "'berlin*'" }"#
        );
    }

    #[test]
    fn test_incremental_one_match_per_context() {
        let outcome = translate(
            &BifContainsIncrementalRenderer,
            "SELECT ?x ?y WHERE { <word:wall> <in-context> ?c1 . ?x <in-context> ?c1 . \
             <word:1989> <in-context> ?c1 . <word:river> <in-context> ?c2 . ?y <in-context> ?c2 }",
        );
        let text = outcome.rewritten().unwrap();

        assert_eq!(text.matches("bif:contains").count(), 2);
        assert!(text.contains("?textc1 bif:contains \"wall and '1989'\""));
        assert!(text.contains("?c2 <text> ?textc2"));
        assert!(!text.contains("<word:"));
    }

    #[test]
    fn test_incremental_non_variable_context_uses_index() {
        let outcome = translate(
            &BifContainsIncrementalRenderer,
            "SELECT ?x WHERE { <word:a> <in-context> ?c . <word:b> <in-context> <Ctx> }",
        );
        let text = outcome.rewritten().unwrap();
        assert!(text.contains("<Ctx> <text> ?text1"));
        assert!(text.contains("?text1 bif:contains \"b\""));
    }

    #[test]
    fn test_incremental_text_variable_avoids_query_variables() {
        let outcome = translate(
            &BifContainsIncrementalRenderer,
            "SELECT ?x WHERE { <word:a> <in-context> ?c . ?x <in-context> ?c . ?x <p> ?textc . \
             ?x <q> ?textc_1 }",
        );
        insta::assert_snapshot!(
            outcome.rewritten().unwrap(),
            @r#"SELECT DISTINCT ?x WHERE { ?x <in-context> ?c . ?x <p> ?textc . ?x <q> ?textc_1 . ?c <text> ?textc_2 . ?textc_2 bif:contains "a" }"#
        );
    }

    #[test]
    fn test_incremental_without_text_search_keeps_query() {
        let outcome = translate(
            &BifContainsIncrementalRenderer,
            "SELECT ?x WHERE { ?x <p> ?y . FILTER(?x != ?y) } LIMIT 3",
        );
        assert_eq!(
            outcome.rewritten().unwrap(),
            "SELECT ?x WHERE { ?x <p> ?y . FILTER(?x != ?y) } LIMIT 3"
        );
    }

    // ========================================================================
    // Entity-pivoted
    // ========================================================================

    #[test]
    fn test_pivot_onto_entity() {
        let outcome = translate(
            &BifContainsRenderer,
            "SELECT ?x WHERE { ?x <is-a> <Person> . <word:berlin> <in-context> ?c . \
             ?x <in-context> ?c }",
        );
        insta::assert_snapshot!(
            outcome.rewritten().unwrap(),
            @r#"SELECT DISTINCT ?x WHERE { ?x <is-a> <Person> . ?x <text> ?text0 . ?text0 bif:contains "berlin" }"#
        );
    }

    #[test]
    fn test_pivot_running_index_across_entities() {
        let outcome = translate(
            &BifContainsRenderer,
            "SELECT DISTINCT ?x WHERE { <word:a> <in-context> ?c1 . ?x <in-context> ?c1 . \
             <word:b> <in-context> ?c2 . ?y <in-context> ?c2 . \
             <word:c> <in-context> ?c3 . ?x <in-context> ?c3 }",
        );
        let text = outcome.rewritten().unwrap();

        assert!(text.starts_with("SELECT DISTINCT ?x WHERE"));
        assert!(text.contains("?x <text> ?text0 . ?text0 bif:contains \"a\""));
        assert!(text.contains("?x <text> ?text1 . ?text1 bif:contains \"c\""));
        assert!(text.contains("?y <text> ?text2 . ?text2 bif:contains \"b\""));
    }

    #[test]
    fn test_pivot_text_variable_avoids_query_variables() {
        let outcome = translate(
            &BifContainsRenderer,
            "SELECT ?x WHERE { <word:a> <in-context> ?c1 . ?x <in-context> ?c1 . ?x <p> ?text0 . \
             <word:b> <in-context> ?c2 . ?y <in-context> ?c2 . ?y <q> ?text2 }",
        );
        let text = outcome.rewritten().unwrap();

        assert!(text.contains("?x <p> ?text0 . ?y <q> ?text2"));
        assert!(text.contains("?x <text> ?text1 . ?text1 bif:contains \"a\""));
        assert!(text.contains("?y <text> ?text3 . ?text3 bif:contains \"b\""));
        assert_eq!(text.matches("<text> ?text0").count(), 0);
    }

    #[test_case(
        "SELECT ?x WHERE { <word:a> <in-context> ?c . <Berlin> <in-context> ?c }",
        "is not a variable" ;
        "iri entity"
    )]
    #[test_case(
        "SELECT ?x WHERE { <word:a> <in-context> ?c . ?x <in-context> ?c . ?y <in-context> ?c }",
        "shared by more than one entity" ;
        "shared context"
    )]
    #[test_case(
        "SELECT ?x WHERE { ?x <in-context> ?c }",
        "has no word" ;
        "context without words"
    )]
    #[test_case(
        "SELECT ?x WHERE { <word:a> <in-context> ?c . ?x <p> ?y }",
        "not linked to any entity" ;
        "words without entity"
    )]
    fn test_pivot_rejections(input: &str, reason: &str) {
        match translate(&BifContainsRenderer, input) {
            TranslationOutcome::Inexpressible(got) => assert!(got.contains(reason), "{}", got),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_pivot_same_entity_twice_is_fine() {
        let outcome = translate(
            &BifContainsRenderer,
            "SELECT ?x WHERE { <word:a> <in-context> ?c . ?x <in-context> ?c . ?x <in-context> ?c }",
        );
        assert!(!outcome.is_inexpressible());
    }
}
