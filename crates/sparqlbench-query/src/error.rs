//! Error types for query translation

use crate::render::Dialect;
use thiserror::Error;

/// Failure to turn a raw query line into a [`ParsedQuery`](crate::ir::ParsedQuery).
///
/// Fatal for the whole line: no dialect is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not have the canonical query shape
    #[error("malformed query: {reason}")]
    MalformedQuery { reason: String },

    /// The query text holds characters no token can start with
    #[error("invalid query text: {errors}")]
    Lex { errors: String },
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedQuery {
            reason: reason.into(),
        }
    }
}

/// Failure of one dialect to represent a parsed query.
///
/// Local to that dialect; the other renderers still run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("inexpressible in {dialect}: {reason}")]
    Inexpressible { dialect: Dialect, reason: String },
}

impl RenderError {
    pub(crate) fn inexpressible(dialect: Dialect, reason: impl Into<String>) -> Self {
        RenderError::Inexpressible {
            dialect,
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            RenderError::Inexpressible { reason, .. } => reason,
        }
    }
}

/// A dialect name that does not match any known dialect
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dialect `{name}` (expected one of: {expected})")]
pub struct UnknownDialect {
    pub name: String,
    pub expected: String,
}
