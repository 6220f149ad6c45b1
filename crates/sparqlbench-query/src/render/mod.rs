//! Dialect renderers.
//!
//! Each renderer first checks whether its target can express the query and
//! then turns the parsed query (plus its context grouping) into the target's
//! literal surface syntax. A query is either fully rewritten or rejected with
//! a reason; there is no partial output.

mod bif_contains;
mod broccoli;
mod native;
mod rdf3x;
pub(crate) mod surface;

pub use bif_contains::{BifContainsIncrementalRenderer, BifContainsRenderer};
pub use broccoli::BroccoliRenderer;
pub use native::NativeRenderer;
pub use rdf3x::Rdf3xRenderer;

use crate::error::{RenderError, UnknownDialect};
use crate::ir::{ParsedQuery, TriplePattern};
use crate::transform::ContextGrouping;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Target query engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dialect {
    /// The engine that understands `<in-context>` natively
    #[serde(rename = "native")]
    Native,
    #[serde(rename = "rdf3x")]
    Rdf3x,
    /// Virtuoso `bif:contains`, pivoted per entity
    #[serde(rename = "bif-contains")]
    BifContains,
    /// Virtuoso `bif:contains` over an incrementally indexed `<text>` relation
    #[serde(rename = "bif-contains-inc")]
    BifContainsIncremental,
    /// Broccoli HTTP query API
    #[serde(rename = "broccoli")]
    Broccoli,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Native,
        Dialect::Rdf3x,
        Dialect::BifContains,
        Dialect::BifContainsIncremental,
        Dialect::Broccoli,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Native => "native",
            Dialect::Rdf3x => "rdf3x",
            Dialect::BifContains => "bif-contains",
            Dialect::BifContainsIncremental => "bif-contains-inc",
            Dialect::Broccoli => "broccoli",
        }
    }

    /// Dialects served by a Virtuoso isql endpoint
    pub fn is_virtuoso(self) -> bool {
        matches!(self, Dialect::BifContains | Dialect::BifContainsIncremental)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Dialect::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| UnknownDialect {
                name: s.to_string(),
                expected: Dialect::ALL.map(Dialect::name).join(", "),
            })
    }
}

/// Everything a renderer gets to look at for one query
#[derive(Debug, Clone, Copy)]
pub struct TranslationInput<'q> {
    pub query: &'q ParsedQuery,
    pub grouping: &'q ContextGrouping,
    /// Triples left after removing word and context clauses
    pub residual: &'q [TriplePattern],
}

/// Result of translating one query into one dialect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "text", rename_all = "snake_case")]
pub enum TranslationOutcome {
    Rewritten(String),
    Inexpressible(String),
}

impl TranslationOutcome {
    pub fn rewritten(&self) -> Option<&str> {
        match self {
            TranslationOutcome::Rewritten(text) => Some(text),
            TranslationOutcome::Inexpressible(_) => None,
        }
    }

    pub fn is_inexpressible(&self) -> bool {
        matches!(self, TranslationOutcome::Inexpressible(_))
    }
}

/// Trait for rendering a parsed query into one target dialect.
pub trait DialectRenderer: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Reject constructs the target cannot represent. Default: accept all.
    fn check(&self, _input: &TranslationInput<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Render an accepted query. Only called after `check` succeeded.
    fn render(&self, input: &TranslationInput<'_>) -> String;

    /// Check, then render
    fn translate(&self, input: &TranslationInput<'_>) -> TranslationOutcome {
        match self.check(input) {
            Ok(()) => TranslationOutcome::Rewritten(self.render(input)),
            Err(err) => {
                debug!(dialect = %self.dialect(), "{}", err);
                TranslationOutcome::Inexpressible(err.reason().to_string())
            }
        }
    }
}

/// Ordered set of dialect renderers.
pub struct DialectRegistry {
    renderers: Vec<Arc<dyn DialectRenderer>>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::all()
    }
}

impl DialectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// All five dialects in their standard order
    pub fn all() -> Self {
        Self::only(&Dialect::ALL)
    }

    /// The built-in renderers for `dialects`, in the order given
    pub fn only(dialects: &[Dialect]) -> Self {
        let mut registry = Self::new();
        for dialect in dialects {
            registry.register(builtin(*dialect));
        }
        registry
    }

    /// Register a renderer, replacing any existing one for the same dialect
    pub fn register(&mut self, renderer: Arc<dyn DialectRenderer>) {
        match self
            .renderers
            .iter()
            .position(|r| r.dialect() == renderer.dialect())
        {
            Some(i) => self.renderers[i] = renderer,
            None => self.renderers.push(renderer),
        }
    }

    pub fn get(&self, dialect: Dialect) -> Option<&dyn DialectRenderer> {
        self.renderers
            .iter()
            .find(|r| r.dialect() == dialect)
            .map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn DialectRenderer> {
        self.renderers.iter().map(|r| r.as_ref())
    }

    /// Registered dialects in order
    pub fn dialects(&self) -> Vec<Dialect> {
        self.renderers.iter().map(|r| r.dialect()).collect()
    }
}

/// Builder for ergonomic registry construction
pub struct DialectRegistryBuilder {
    renderers: Vec<Arc<dyn DialectRenderer>>,
}

impl Default for DialectRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectRegistryBuilder {
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Add a renderer to the registry
    pub fn with_renderer(mut self, renderer: impl DialectRenderer + 'static) -> Self {
        self.renderers.push(Arc::new(renderer));
        self
    }

    /// Build the registry
    pub fn build(self) -> DialectRegistry {
        let mut registry = DialectRegistry::new();
        for renderer in self.renderers {
            registry.register(renderer);
        }
        registry
    }
}

fn builtin(dialect: Dialect) -> Arc<dyn DialectRenderer> {
    match dialect {
        Dialect::Native => Arc::new(NativeRenderer),
        Dialect::Rdf3x => Arc::new(Rdf3xRenderer),
        Dialect::BifContains => Arc::new(BifContainsRenderer),
        Dialect::BifContainsIncremental => Arc::new(BifContainsIncrementalRenderer),
        Dialect::Broccoli => Arc::new(BroccoliRenderer),
    }
}
