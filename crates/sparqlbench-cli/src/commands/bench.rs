//! `sqb bench`: run the workload on every engine and report timings

use crate::batch::{DialectBatch, QueryFile};
use crate::cli::{selected_dialects, OutputFormat};
use crate::config::BenchConfig;
use crate::error::RunnerError;
use crate::report::{format_counts, Report};
use crate::runner::{align_measurements, HttpRunner, Measurement, ProcessRunner, QueryRunner};
use anyhow::Result;
use indexmap::IndexMap;
use sparqlbench_query::Dialect;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Build the runner for `dialect` from the config
pub fn runner_for(
    dialect: Dialect,
    config: &BenchConfig,
    virtuoso_pwd: Option<&str>,
) -> Result<Box<dyn QueryRunner>, RunnerError> {
    let runner: Box<dyn QueryRunner> = match dialect {
        Dialect::BifContains | Dialect::BifContainsIncremental => {
            let password = virtuoso_pwd.ok_or(RunnerError::MissingPassword(dialect))?;
            Box::new(ProcessRunner::isql(dialect, &config.virtuoso, password))
        }
        Dialect::Rdf3x => Box::new(ProcessRunner::rdf3x(&config.rdf3x)),
        Dialect::Native => Box::new(ProcessRunner::native(&config.native)),
        Dialect::Broccoli => Box::new(HttpRunner::from_config(&config.broccoli)?),
    };
    Ok(runner)
}

/// Run one batch and align its output with the query file.
///
/// Runner failures are logged and leave the dialect's column missing.
pub async fn measure(runner: &dyn QueryRunner, batch: &DialectBatch) -> Vec<Measurement> {
    if batch.is_empty() {
        info!(dialect = %batch.dialect, "nothing to run");
        return align_measurements(batch, Vec::new()).0;
    }

    let raw = match runner.run(batch).await {
        Ok(raw) => raw,
        Err(err) => {
            error!(dialect = %batch.dialect, "{}", err);
            Vec::new()
        }
    };
    let (aligned, unbalanced) = align_measurements(batch, raw);
    if let Some(unbalanced) = unbalanced {
        warn!("{}", unbalanced);
    }
    aligned
}

/// Run every dialect in turn. Engines run one after another so timings do
/// not interfere.
pub async fn run_all(
    file: &QueryFile,
    dialects: &[Dialect],
    config: &BenchConfig,
    virtuoso_pwd: Option<&str>,
) -> IndexMap<Dialect, Vec<Measurement>> {
    let mut columns = IndexMap::new();
    for dialect in dialects {
        let batch = DialectBatch::build(*dialect, file);
        let column = match runner_for(*dialect, config, virtuoso_pwd) {
            Ok(runner) => measure(runner.as_ref(), &batch).await,
            Err(err) => {
                error!(%dialect, "{}", err);
                align_measurements(&batch, Vec::new()).0
            }
        };
        let measured = column.iter().filter(|m| m.rows().is_some()).count();
        info!(%dialect, measured, skipped = batch.skipped.len(), "engine done");
        columns.insert(*dialect, column);
    }
    columns
}

/// Execute bench command
pub async fn execute(
    config: BenchConfig,
    file: PathBuf,
    virtuoso_pwd: Option<String>,
    dialects: Vec<Dialect>,
    format: OutputFormat,
) -> Result<()> {
    let dialects = selected_dialects(&dialects);
    let queries = super::load_queries(&file, &dialects)?;

    let columns = run_all(&queries, &dialects, &config, virtuoso_pwd.as_deref()).await;
    let report = Report::build(&queries, &columns);

    for (row, counts) in report.disagreements() {
        warn!(id = %row.id, "different counts: {}", format_counts(&counts));
    }

    let rendered = match format {
        OutputFormat::Table => report.to_table(),
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Tsv => report.to_tsv(),
    };
    println!("{}", rendered);
    Ok(())
}
