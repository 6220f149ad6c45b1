//! Engine runners.
//!
//! A runner executes one [`DialectBatch`] against its engine and returns one
//! [`Measurement`] per query it managed to observe. Positions are restored
//! afterwards with [`align_measurements`].

mod http;
pub mod output;
mod process;

pub use http::HttpRunner;
pub use process::ProcessRunner;

use crate::batch::DialectBatch;
use crate::error::RunnerError;
use async_trait::async_trait;
use serde::Serialize;
use sparqlbench_query::Dialect;
use std::fmt;

/// Timing and result size of one query on one engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Measurement {
    Measured { elapsed_ms: f64, rows: u64 },
    /// The dialect could not express the query
    Skipped,
    /// The engine produced no output for this position
    Missing,
}

impl Measurement {
    /// Row count, if the query was actually run
    pub fn rows(&self) -> Option<u64> {
        match self {
            Measurement::Measured { rows, .. } => Some(*rows),
            _ => None,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Measured { elapsed_ms, .. } => write!(f, "{}ms", elapsed_ms),
            Measurement::Skipped => f.write_str("-"),
            Measurement::Missing => f.write_str("?"),
        }
    }
}

/// Executes batches for one dialect
#[async_trait]
pub trait QueryRunner: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Run every line of `batch`, returning measurements in output order
    async fn run(&self, batch: &DialectBatch) -> Result<Vec<Measurement>, RunnerError>;
}

/// Engine output that did not match the number of queries sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbalancedOutputCount {
    pub dialect: Dialect,
    pub queries: usize,
    pub measurements: usize,
}

impl fmt::Display for UnbalancedOutputCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: sent {} queries but parsed {} measurements",
            self.dialect, self.queries, self.measurements
        )
    }
}

/// Spread raw measurements over all `batch.total` positions.
///
/// Skipped positions get [`Measurement::Skipped`]. If the engine produced
/// fewer measurements than queries, trailing positions get
/// [`Measurement::Missing`]; extra measurements are dropped. Either case is
/// reported, never treated as fatal.
pub fn align_measurements(
    batch: &DialectBatch,
    raw: Vec<Measurement>,
) -> (Vec<Measurement>, Option<UnbalancedOutputCount>) {
    let unbalanced = (raw.len() != batch.lines.len()).then(|| UnbalancedOutputCount {
        dialect: batch.dialect,
        queries: batch.lines.len(),
        measurements: raw.len(),
    });

    let mut raw = raw.into_iter();
    let aligned = (0..batch.total)
        .map(|index| {
            if batch.skipped.contains(&index) {
                Measurement::Skipped
            } else {
                raw.next().unwrap_or(Measurement::Missing)
            }
        })
        .collect();

    (aligned, unbalanced)
}
