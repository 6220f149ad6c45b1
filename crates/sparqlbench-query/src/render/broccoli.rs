//! Broccoli HTTP query renderer.
//!
//! Broccoli takes a query as URL parameters rather than SPARQL:
//!
//! ```text
//! ?s=$1 :r:is-a :e:City;$1 :r:occurs-with berlin*&query=$1&nofinstances=5…
//! ```
//!
//! Variables become positional `$N` placeholders with `$1` the single
//! result variable. Relations live under `:r:` and entities under `:e:`.

use crate::error::RenderError;
use crate::ir::{Term, WordPattern};
use crate::render::{Dialect, DialectRenderer, TranslationInput};
use indexmap::IndexMap;

const FIXED_PARAMS: &str = "&nofrelations=0&nofhitgroups=0&nofclasses=0";
const DEFAULT_INSTANCES: u64 = 999_999;

pub struct BroccoliRenderer;

impl BroccoliRenderer {
    fn reject(reason: impl Into<String>) -> RenderError {
        RenderError::inexpressible(Dialect::Broccoli, reason)
    }
}

impl DialectRenderer for BroccoliRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Broccoli
    }

    fn check(&self, input: &TranslationInput<'_>) -> Result<(), RenderError> {
        let query = input.query;

        match query.projection.len() {
            0 => return Err(Self::reject("no projected variable to return")),
            1 => {}
            n => {
                return Err(Self::reject(format!(
                    "multi-variable projection ({} variables) is not supported",
                    n
                )))
            }
        }
        if !query.filters.is_empty() {
            return Err(Self::reject("FILTER is not supported"));
        }
        if query.modifiers.order_by.is_some() {
            return Err(Self::reject("ORDER BY is not supported"));
        }
        if let Some(trailing) = query.modifiers.trailing() {
            return Err(Self::reject(format!("unrecognized modifier `{}`", trailing)));
        }

        if let Some(triple) = input
            .residual
            .iter()
            .find(|t| !matches!(t.predicate, Term::Iri(_)))
        {
            return Err(Self::reject(format!(
                "predicate {} of `{}` is not a relation",
                triple.predicate, triple
            )));
        }

        let grouping = input.grouping;
        if let Some((entity, _)) = grouping.links().iter().find(|(e, _)| !e.is_variable()) {
            return Err(Self::reject(format!(
                "<in-context> subject {} is not a variable",
                entity
            )));
        }
        if let Some(context) = grouping
            .context_to_entities
            .keys()
            .find(|c| !grouping.context_to_words.contains_key(*c))
        {
            return Err(Self::reject(format!(
                "context {} has entities but no words to match",
                context
            )));
        }

        Ok(())
    }

    fn render(&self, input: &TranslationInput<'_>) -> String {
        let query = input.query;
        let grouping = input.grouping;
        let mut names = Placeholders::new(&query.variables());
        let mut clauses = Vec::new();

        for triple in input.residual {
            let relation = match &triple.predicate {
                Term::Iri(iri) => iri.as_str(),
                _ => continue,
            };
            let direct_object = relation == "is-a";
            let subject = names.term(&triple.subject, false, &mut clauses);
            let object = names.term(&triple.object, direct_object, &mut clauses);
            clauses.push(format!("{} :r:{} {}", subject, relation, object));
        }

        for (context, entities) in &grouping.context_to_entities {
            let Some((first, rest)) = entities.split_first() else {
                continue;
            };
            let mut parts = vec![names.term(first, false, &mut clauses), ":r:occurs-with".into()];
            parts.extend(words(grouping.words_for(context).unwrap_or_default()));
            for entity in rest {
                parts.push(names.term(entity, false, &mut clauses));
            }
            clauses.push(parts.join(" "));
        }

        for (context, ws) in &grouping.context_to_words {
            if !grouping.context_to_entities.contains_key(context) {
                let mut parts = vec!["$1".to_string(), ":r:has-occurrence-of".into()];
                parts.extend(words(ws));
                clauses.push(parts.join(" "));
            }
        }

        let mut params = format!(
            "{}&nofinstances={}",
            FIXED_PARAMS,
            query.modifiers.limit.unwrap_or(DEFAULT_INSTANCES)
        );
        if let Some(offset) = query.modifiers.offset {
            params.push_str(&format!("&firstinstance={}", offset));
        }

        format!("?s={}&query=$1{}", clauses.join(";"), params)
    }
}

fn words(patterns: &[WordPattern]) -> impl Iterator<Item = String> + '_ {
    patterns.iter().map(|w| w.as_str().to_string())
}

/// Positional `$N` names: input variables first, then one fresh name per
/// IRI occurrence.
struct Placeholders<'q> {
    variables: IndexMap<&'q str, usize>,
    next: usize,
}

impl<'q> Placeholders<'q> {
    fn new(variables: &[&'q str]) -> Self {
        let variables: IndexMap<&str, usize> = variables
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i + 1))
            .collect();
        let next = variables.len() + 1;
        Self { variables, next }
    }

    fn fresh(&mut self) -> String {
        let name = format!("${}", self.next);
        self.next += 1;
        name
    }

    /// Name for one term occurrence. IRIs get a fresh placeholder bound by
    /// an `:r:equals` clause, unless `direct` asks for the bare entity.
    fn term(&mut self, term: &Term, direct: bool, clauses: &mut Vec<String>) -> String {
        match term {
            Term::Variable(name) => match self.variables.get(name.as_str()) {
                Some(n) => format!("${}", n),
                None => self.fresh(),
            },
            Term::Iri(entity) if direct => format!(":e:{}", entity),
            Term::Iri(entity) => {
                let name = self.fresh();
                clauses.push(format!("{} :r:equals :e:{}", name, entity));
                name
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TranslationOutcome;
    use crate::syntax::parse_query;
    use crate::transform::ContextGrouping;
    use test_case::test_case;

    fn broccoli(input: &str) -> TranslationOutcome {
        let query = parse_query(input).unwrap();
        let (grouping, residual) = ContextGrouping::extract(&query);
        BroccoliRenderer.translate(&TranslationInput {
            query: &query,
            grouping: &grouping,
            residual: &residual,
        })
    }

    #[test]
    fn test_is_a_object_maps_directly() {
        let outcome = broccoli("SELECT ?x WHERE { ?x <is-a> <City> . } LIMIT 5");
        assert_eq!(
            outcome.rewritten().unwrap(),
            "?s=$1 :r:is-a :e:City&query=$1&nofrelations=0&nofhitgroups=0&nofclasses=0&nofinstances=5"
        );
    }

    #[test]
    fn test_iri_terms_get_equality_clauses() {
        let outcome = broccoli("SELECT ?x WHERE { <Berlin> <capital-of> ?y . ?x <born-in> <Berlin> }");
        insta::assert_snapshot!(
            outcome.rewritten().unwrap(),
            @"?s=$3 :r:equals :e:Berlin;$3 :r:capital-of $2;$4 :r:equals :e:Berlin;$1 :r:born-in $4&query=$1&nofrelations=0&nofhitgroups=0&nofclasses=0&nofinstances=999999"
        );
    }

    #[test]
    fn test_occurs_with_and_has_occurrence_of() {
        let outcome = broccoli(
            "SELECT ?x WHERE { ?x <is-a> <Person> . <word:berlin> <in-context> ?c . \
             ?x <in-context> ?c . ?y <in-context> ?c . <word:wall*> <in-context> ?d } \
             LIMIT 10 OFFSET 20",
        );
        let text = outcome.rewritten().unwrap();

        assert!(text.starts_with("?s=$1 :r:is-a :e:Person;$1 :r:occurs-with berlin $3;"));
        assert!(text.contains(";$1 :r:has-occurrence-of wall*&query=$1"));
        assert!(text.ends_with("&nofinstances=10&firstinstance=20"));
    }

    #[test]
    fn test_variables_renumbered_bijectively() {
        let outcome = broccoli("SELECT ?z WHERE { ?a <p> ?b . ?b <q> ?z . ?z <r> ?a }");
        let text = outcome.rewritten().unwrap();

        assert!(text.starts_with("?s=$2 :r:p $3;$3 :r:q $1;$1 :r:r $2&"));
        assert_eq!(text.matches('?').count(), 1);
    }

    #[test_case("SELECT ?x ?y WHERE { ?x <p> ?y }", "multi-variable projection" ; "two variables")]
    #[test_case("SELECT * WHERE { ?x <p> ?y }", "no projected variable" ; "wildcard")]
    #[test_case("SELECT ?x WHERE { ?x <p> ?y . FILTER(?x != ?y) }", "FILTER" ; "filter")]
    #[test_case("SELECT ?x WHERE { ?x <p> ?y } ORDER BY ?y", "ORDER BY" ; "order by")]
    #[test_case("SELECT ?x WHERE { ?x <p> ?y } GROUP BY ?x LIMIT 2", "unrecognized modifier `GROUP BY ?x`" ; "group by")]
    #[test_case("SELECT ?x WHERE { ?x ?p ?y }", "is not a relation" ; "variable predicate")]
    #[test_case("SELECT ?x WHERE { <Berlin> <in-context> ?c . <word:a> <in-context> ?c }", "is not a variable" ; "iri entity")]
    #[test_case("SELECT ?x WHERE { ?x <in-context> ?c }", "no words to match" ; "context without words")]
    fn test_rejections(input: &str, reason: &str) {
        match broccoli(input) {
            TranslationOutcome::Inexpressible(got) => assert!(got.contains(reason), "{}", got),
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
