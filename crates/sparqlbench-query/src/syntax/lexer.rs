//! Tokenizer for canonical query text.
//!
//! Tokens are IRIs, variables, literals, operators, names and the
//! punctuation in [`PUNCTUATION`]. Any other character, or a quote that is
//! never closed, is a lexer error. Each token carries its byte span so the
//! parser can slice opaque clauses back out of the source unchanged.

use chumsky::extra;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use std::fmt;

/// Characters that stand alone as [`Token::Punct`]
pub const PUNCTUATION: &str = "{}().,;*/";

/// Extra type for parsers - uses Rich errors for better messages
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// A token together with its byte span in the source
pub type Spanned<T> = (T, SimpleSpan);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    /// `<…>` with the brackets stripped
    Iri(&'src str),
    /// `?name` or `$name` with the sigil stripped
    Var(&'src str),
    /// Quoted literal including quotes and any `@lang` / `^^<dt>` suffix
    Literal(&'src str),
    /// Keywords, numbers and prefixed names
    Name(&'src str),
    /// Comparison and boolean operators
    Op(&'src str),
    /// One character of [`PUNCTUATION`]
    Punct(char),
}

impl Token<'_> {
    /// Case-insensitive keyword check
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Name(name) if name.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Iri(iri) => write!(f, "<{}>", iri),
            Token::Var(name) => write!(f, "?{}", name),
            Token::Literal(text) | Token::Name(text) | Token::Op(text) => f.write_str(text),
            Token::Punct(c) => write!(f, "{}", c),
        }
    }
}

// ============================================================================
// Token parsers
// ============================================================================

fn iri<'src>() -> impl Parser<'src, &'src str, Token<'src>, Extra<'src>> + Clone {
    just('<')
        .ignore_then(none_of("<>\"{}| \t\r\n").repeated().to_slice())
        .then_ignore(just('>'))
        .map(Token::Iri)
        .labelled("IRI like <City>")
}

fn variable<'src>() -> impl Parser<'src, &'src str, Token<'src>, Extra<'src>> + Clone {
    one_of("?$")
        .ignore_then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || *c == '_')
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .map(Token::Var)
        .labelled("variable like ?x")
}

fn literal<'src>() -> impl Parser<'src, &'src str, Token<'src>, Extra<'src>> + Clone {
    let double_quoted = just('"')
        .then(none_of("\"").repeated())
        .then(just('"'))
        .ignored();
    let single_quoted = just('\'')
        .then(none_of("'").repeated())
        .then(just('\''))
        .ignored();

    let language = just('@')
        .then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || *c == '-')
                .repeated()
                .at_least(1),
        )
        .ignored();
    let datatype = just("^^")
        .then(just('<'))
        .then(none_of("> \t\r\n").repeated())
        .then(just('>'))
        .ignored();

    double_quoted
        .or(single_quoted)
        .then(language.or(datatype).or_not())
        .to_slice()
        .map(Token::Literal)
        .labelled("literal")
}

fn operator<'src>() -> impl Parser<'src, &'src str, Token<'src>, Extra<'src>> + Clone {
    choice((
        just("!="),
        just("<="),
        just(">="),
        just("&&"),
        just("||"),
        just("="),
        just("<"),
        just(">"),
        just("!"),
    ))
    .to_slice()
    .map(Token::Op)
    .labelled("operator")
}

fn name<'src>() -> impl Parser<'src, &'src str, Token<'src>, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '+'))
        .repeated()
        .at_least(1)
        .to_slice()
        .map(Token::Name)
        .labelled("name")
}

fn punct<'src>() -> impl Parser<'src, &'src str, Token<'src>, Extra<'src>> + Clone {
    one_of(PUNCTUATION).map(Token::Punct).labelled("punctuation")
}

/// Lexer for a whole query text
pub fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<Spanned<Token<'src>>>, Extra<'src>> {
    choice((iri(), variable(), literal(), operator(), name(), punct()))
        .map_with(|token, e| (token, e.span()))
        .padded()
        .repeated()
        .collect::<Vec<_>>()
        .padded()
}

/// Tokenize `input`, describing any rejected characters
pub fn tokenize(input: &str) -> Result<Vec<Spanned<Token<'_>>>, String> {
    lexer().parse(input).into_result().map_err(|errs| {
        errs.iter()
            .map(|e| describe_error(e, input))
            .collect::<Vec<_>>()
            .join("; ")
    })
}

/// `line:column: unexpected X`, with a 1-based character column
fn describe_error(error: &Rich<'_, char>, input: &str) -> String {
    let before = &input[..error.span().start];
    let line = before.matches('\n').count() + 1;
    let column = before.chars().rev().take_while(|c| *c != '\n').count() + 1;
    match error.found() {
        Some(c) => format!("{}:{}: unexpected {:?}", line, column, c),
        None => format!("{}:{}: unexpected end of input", line, column),
    }
}
