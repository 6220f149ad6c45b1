//! Canonical query parser.
//!
//! Works over the token stream from [`lexer`](super::lexer) and recognizes
//! exactly the shapes the canonical generator produces:
//!
//! ```text
//! SELECT [DISTINCT] ?v… WHERE { s p o . s p o . FILTER(…) } [ORDER BY …] [LIMIT n] [OFFSET n]
//! ```
//!
//! Unrecognized text after the triple block is kept verbatim, in source
//! order, among [`Modifiers::clauses`].

use crate::error::ParseError;
use crate::ir::{
    FilterExpr, ModifierClause, Modifiers, OrderCondition, ParsedQuery, Term, TriplePattern,
    WORD_PREFIX,
};
use crate::syntax::lexer::{tokenize, Spanned, Token};

type Tokens<'t, 'src> = &'t [Spanned<Token<'src>>];

/// Parse the query text of one line
pub fn parse_query(input: &str) -> Result<ParsedQuery, ParseError> {
    let tokens = tokenize(input).map_err(|errors| ParseError::Lex { errors })?;

    let where_at = tokens
        .iter()
        .position(|(token, _)| token.is_keyword("WHERE"))
        .ok_or_else(|| ParseError::malformed("missing WHERE keyword"))?;
    let (distinct, projection) = parse_projection(&tokens[..where_at])?;

    let body = &tokens[where_at + 1..];
    if !matches!(body.first(), Some((Token::Punct('{'), _))) {
        return Err(ParseError::malformed("expected '{' after WHERE"));
    }
    let close = body
        .iter()
        .position(|(token, _)| *token == Token::Punct('}'))
        .ok_or_else(|| ParseError::malformed("missing closing '}' for the triple block"))?;

    let block = &body[1..close];
    if block.iter().any(|(token, _)| *token == Token::Punct('{')) {
        return Err(ParseError::malformed("nested group patterns are not supported"));
    }
    let (triples, filters) = parse_block(block, input)?;
    let modifiers = parse_modifiers(&body[close + 1..], input)?;

    Ok(ParsedQuery {
        distinct,
        projection,
        triples,
        filters,
        modifiers,
    })
}

// ============================================================================
// SELECT prefix
// ============================================================================

fn parse_projection(tokens: Tokens<'_, '_>) -> Result<(bool, Vec<String>), ParseError> {
    let mut rest = match tokens.split_first() {
        Some(((token, _), rest)) if token.is_keyword("SELECT") => rest,
        _ => return Err(ParseError::malformed("query must start with SELECT")),
    };

    let mut distinct = false;
    if let Some(((token, _), after)) = rest.split_first() {
        if token.is_keyword("DISTINCT") {
            distinct = true;
            rest = after;
        }
    }

    let mut projection = Vec::new();
    let mut wildcard = false;
    for (token, _) in rest {
        match token {
            Token::Var(name) => projection.push(name.to_string()),
            Token::Punct('*') if !wildcard && projection.is_empty() => wildcard = true,
            other => {
                return Err(ParseError::malformed(format!(
                    "unexpected `{}` in SELECT clause",
                    other
                )))
            }
        }
    }
    if wildcard && !projection.is_empty() {
        return Err(ParseError::malformed("SELECT * cannot be mixed with variables"));
    }

    Ok((distinct, projection))
}

// ============================================================================
// Triple block
// ============================================================================

fn parse_block(
    block: Tokens<'_, '_>,
    source: &str,
) -> Result<(Vec<TriplePattern>, Vec<FilterExpr>), ParseError> {
    let mut triples = Vec::new();
    let mut filters = Vec::new();
    let mut pending: Vec<Term> = Vec::new();

    let mut i = 0;
    while i < block.len() {
        let (token, _) = &block[i];
        if *token == Token::Punct('.') {
            flush_triple(&mut pending, &mut triples)?;
            i += 1;
        } else if token.is_keyword("FILTER") {
            flush_triple(&mut pending, &mut triples)?;
            let (filter, next) = parse_filter(block, i, source)?;
            filters.push(filter);
            i = next;
        } else {
            pending.push(term_from_token(token)?);
            i += 1;
        }
    }
    flush_triple(&mut pending, &mut triples)?;

    Ok((triples, filters))
}

fn flush_triple(pending: &mut Vec<Term>, triples: &mut Vec<TriplePattern>) -> Result<(), ParseError> {
    if pending.is_empty() {
        return Ok(());
    }
    let terms = std::mem::take(pending);
    match <[Term; 3]>::try_from(terms) {
        Ok([subject, predicate, object]) => {
            triples.push(TriplePattern::new(subject, predicate, object));
            Ok(())
        }
        Err(terms) => Err(ParseError::malformed(format!(
            "triple `{}` does not have exactly three terms",
            terms
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        ))),
    }
}

fn term_from_token(token: &Token<'_>) -> Result<Term, ParseError> {
    match token {
        Token::Var(name) => Ok(Term::variable(*name)),
        Token::Iri(iri) => match iri.strip_prefix(WORD_PREFIX) {
            Some("") => Err(ParseError::malformed("empty word pattern <word:>")),
            Some(pattern) => Ok(Term::word(pattern)),
            None => Ok(Term::iri(*iri)),
        },
        Token::Literal(text) | Token::Name(text) => Ok(Term::Literal(text.to_string())),
        other => Err(ParseError::malformed(format!(
            "unexpected `{}` in triple block",
            other
        ))),
    }
}

/// Parse `FILTER( … )` starting at `start`; returns the filter and the index
/// just past the closing parenthesis.
fn parse_filter(
    block: Tokens<'_, '_>,
    start: usize,
    source: &str,
) -> Result<(FilterExpr, usize), ParseError> {
    if !matches!(block.get(start + 1), Some((Token::Punct('('), _))) {
        return Err(ParseError::malformed("expected '(' after FILTER"));
    }

    let mut depth = 0usize;
    let mut close = None;
    for (offset, (token, _)) in block[start + 1..].iter().enumerate() {
        match token {
            Token::Punct('(') => depth += 1,
            Token::Punct(')') => {
                depth -= 1;
                if depth == 0 {
                    close = Some(start + 1 + offset);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| ParseError::malformed("unterminated FILTER expression"))?;

    let inner = &block[start + 2..close];
    let filter = match inner {
        [(lhs, _), (Token::Op("!="), _), (rhs, _)] => {
            match (term_from_token(lhs), term_from_token(rhs)) {
                (Ok(lhs), Ok(rhs)) => Some(FilterExpr::NotEqual { lhs, rhs }),
                _ => None,
            }
        }
        _ => None,
    };
    let filter = filter.unwrap_or_else(|| {
        let from = block[start].1.start;
        let to = block[close].1.end;
        FilterExpr::Opaque(source[from..to].to_string())
    });

    Ok((filter, close + 1))
}

// ============================================================================
// Solution modifiers
// ============================================================================

fn parse_modifiers(tokens: Tokens<'_, '_>, source: &str) -> Result<Modifiers, ParseError> {
    let mut modifiers = Modifiers::default();
    // Byte range of the unrecognized run being collected
    let mut verbatim: Option<(usize, usize)> = None;

    let mut i = 0;
    while i < tokens.len() {
        let (token, span) = &tokens[i];
        let clause = if token.is_keyword("ORDER") {
            if !matches!(tokens.get(i + 1), Some((t, _)) if t.is_keyword("BY")) {
                return Err(ParseError::malformed("expected BY after ORDER"));
            }
            let (conditions, next) = parse_order_conditions(tokens, i + 2)?;
            modifiers.order_by = Some(conditions);
            i = next;
            ModifierClause::OrderBy
        } else if token.is_keyword("LIMIT") {
            modifiers.limit = Some(parse_count(tokens.get(i + 1), "LIMIT")?);
            i += 2;
            ModifierClause::Limit
        } else if token.is_keyword("OFFSET") {
            modifiers.offset = Some(parse_count(tokens.get(i + 1), "OFFSET")?);
            i += 2;
            ModifierClause::Offset
        } else {
            let from = verbatim.map_or(span.start, |(from, _)| from);
            verbatim = Some((from, span.end));
            i += 1;
            continue;
        };

        if let Some((from, to)) = verbatim.take() {
            modifiers
                .clauses
                .push(ModifierClause::Verbatim(source[from..to].to_string()));
        }
        if !modifiers.clauses.contains(&clause) {
            modifiers.clauses.push(clause);
        }
    }
    if let Some((from, to)) = verbatim {
        modifiers
            .clauses
            .push(ModifierClause::Verbatim(source[from..to].to_string()));
    }

    Ok(modifiers)
}

fn parse_count(token: Option<&Spanned<Token<'_>>>, keyword: &str) -> Result<u64, ParseError> {
    match token {
        Some((Token::Name(text), _)) => text.parse::<u64>().map_err(|_| {
            ParseError::malformed(format!("{} expects a non-negative integer, got `{}`", keyword, text))
        }),
        Some((other, _)) => Err(ParseError::malformed(format!(
            "{} expects a non-negative integer, got `{}`",
            keyword, other
        ))),
        None => Err(ParseError::malformed(format!("{} is missing its value", keyword))),
    }
}

/// Parse `?x`, `(?x)`, `ASC(?x)` and `DESC(?x)` keys until a non-key token
fn parse_order_conditions(
    tokens: Tokens<'_, '_>,
    start: usize,
) -> Result<(Vec<OrderCondition>, usize), ParseError> {
    let mut conditions = Vec::new();
    let mut i = start;

    loop {
        let (ascending, term_at) = match tokens.get(i) {
            Some((Token::Var(_), _)) => (true, None),
            Some((token, _)) if token.is_keyword("ASC") => (true, Some(i + 2)),
            Some((token, _)) if token.is_keyword("DESC") => (false, Some(i + 2)),
            Some((Token::Punct('('), _)) => (true, Some(i + 1)),
            _ => break,
        };

        match term_at {
            None => {
                if let Some((token, _)) = tokens.get(i) {
                    conditions.push(OrderCondition {
                        term: term_from_token(token)?,
                        ascending,
                    });
                }
                i += 1;
            }
            Some(at) => {
                if at > i + 1 && !matches!(tokens.get(i + 1), Some((Token::Punct('('), _))) {
                    return Err(ParseError::malformed("expected '(' in ORDER BY condition"));
                }
                let term = match tokens.get(at) {
                    Some((token, _)) => term_from_token(token)?,
                    None => return Err(ParseError::malformed("unterminated ORDER BY condition")),
                };
                if !matches!(tokens.get(at + 1), Some((Token::Punct(')'), _))) {
                    return Err(ParseError::malformed("expected ')' in ORDER BY condition"));
                }
                conditions.push(OrderCondition { term, ascending });
                i = at + 2;
            }
        }
    }

    if conditions.is_empty() {
        return Err(ParseError::malformed("ORDER BY needs at least one condition"));
    }
    Ok((conditions, i))
}
