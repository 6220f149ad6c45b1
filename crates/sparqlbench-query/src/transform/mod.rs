//! Transforms applied between parsing and rendering.

mod context;

pub use context::ContextGrouping;
