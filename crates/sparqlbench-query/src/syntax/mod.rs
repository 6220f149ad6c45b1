//! Canonical query syntax.
//!
//! Input lines look like `id<TAB>SELECT … WHERE { … } …`. The lexer turns
//! the query text into spanned tokens and the parser builds a
//! [`ParsedQuery`] from them.

pub mod lexer;
mod parser;

pub use parser::parse_query;

use crate::error::ParseError;
use crate::ir::ParsedQuery;

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLine {
    pub id: String,
    pub query: ParsedQuery,
}

/// Parse an `id<TAB>query-text` line
pub fn parse_line(line: &str) -> Result<QueryLine, ParseError> {
    let (id, text) = line
        .trim()
        .split_once('\t')
        .ok_or_else(|| ParseError::malformed("expected `id<TAB>query` but found no tab"))?;

    Ok(QueryLine {
        id: id.trim().to_string(),
        query: parse_query(text.trim())?,
    })
}
