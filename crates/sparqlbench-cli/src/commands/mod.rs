pub mod bench;
pub mod emit;
pub mod translate;

use crate::batch::QueryFile;
use anyhow::{Context, Result};
use sparqlbench_query::{Dialect, Transpiler};
use std::path::Path;
use tracing::info;

/// Read and translate a query file for `dialects`
pub(crate) fn load_queries(path: &Path, dialects: &[Dialect]) -> Result<QueryFile> {
    let transpiler = Transpiler::with_dialects(dialects);
    let file = QueryFile::read(path, &transpiler)
        .with_context(|| format!("Failed to read query file {}", path.display()))?;
    let malformed = file
        .entries
        .iter()
        .filter(|entry| entry.translation.is_err())
        .count();
    info!(queries = file.len(), malformed, "loaded {}", path.display());
    Ok(file)
}
