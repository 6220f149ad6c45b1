//! # sparqlbench query translation
//!
//! Translates canonical text-search SPARQL queries into the surface syntax
//! of five query engines so the same workload can be benchmarked on each.
//!
//! Canonical queries use two pseudo-predicates on top of plain triples:
//!
//! - `<word:berlin*> <in-context> ?c`: context `?c` contains a word matching `berlin*`
//! - `?x <in-context> ?c`: entity `?x` occurs in context `?c`
//!
//! ## Pipeline
//!
//! ```text
//! id<TAB>query ─► syntax ─► ParsedQuery ─► transform ─► ContextGrouping
//!                                               │
//!                       ┌───────────────────────┘
//!                       ▼
//!                render (one DialectRenderer per target)
//!                       │
//!                       ▼
//!        Rewritten(text) | Inexpressible(reason)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use sparqlbench_query::{Dialect, Transpiler};
//!
//! let line = Transpiler::default()
//!     .translate_line("q1\tSELECT ?x WHERE { ?x <is-a> <City> . } LIMIT 5")
//!     .unwrap();
//! assert_eq!(
//!     line.outcome(Dialect::Native).and_then(|o| o.rewritten()),
//!     Some("SELECT ?x WHERE { ?x <is-a> <City> } LIMIT 5")
//! );
//! ```

pub mod error;
pub mod ir;
pub mod render;
pub mod syntax;
pub mod transform;
mod transpile;

pub use error::{ParseError, RenderError, UnknownDialect};
pub use ir::{FilterExpr, ModifierClause, Modifiers, OrderCondition, ParsedQuery, Term, TriplePattern, WordPattern};
pub use render::{
    Dialect, DialectRegistry, DialectRegistryBuilder, DialectRenderer, TranslationInput,
    TranslationOutcome,
};
pub use syntax::{parse_line, parse_query, QueryLine};
pub use transform::ContextGrouping;
pub use transpile::{LineTranslation, Transpiler};
