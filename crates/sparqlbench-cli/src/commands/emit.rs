//! `sqb emit`: write engine-ready batch files

use crate::batch::{DialectBatch, QueryFile};
use crate::cli::selected_dialects;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use sparqlbench_query::{Dialect, TranslationOutcome};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SKIPPED_MANIFEST: &str = "skipped.json";

/// Why one line is missing from a dialect's batch file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedQuery {
    pub id: String,
    pub line: usize,
    pub reason: String,
}

fn skipped_queries(batch: &DialectBatch, file: &QueryFile) -> Vec<SkippedQuery> {
    batch
        .skipped
        .iter()
        .filter_map(|index| file.entries.get(*index))
        .map(|entry| {
            let reason = match &entry.translation {
                Err(err) => err.to_string(),
                Ok(_) => match entry.outcome(batch.dialect) {
                    Some(TranslationOutcome::Inexpressible(reason)) => reason.clone(),
                    _ => "not translated".to_string(),
                },
            };
            SkippedQuery {
                id: entry.id(),
                line: entry.line_no,
                reason,
            }
        })
        .collect()
}

/// Write one batch file per dialect plus the skip manifest; returns the
/// written batch paths
pub fn write_batches(
    file: &QueryFile,
    dialects: &[Dialect],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut written = Vec::new();
    let mut manifest: IndexMap<Dialect, Vec<SkippedQuery>> = IndexMap::new();
    for dialect in dialects {
        let batch = DialectBatch::build(*dialect, file);
        let path = out_dir.join(batch.file_name());
        std::fs::write(&path, batch.file_contents())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(%dialect, queries = batch.lines.len(), skipped = batch.skipped.len(), "wrote {}", path.display());

        manifest.insert(*dialect, skipped_queries(&batch, file));
        written.push(path);
    }

    let manifest_path = out_dir.join(SKIPPED_MANIFEST);
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    Ok(written)
}

/// Execute emit command
pub async fn execute(file: PathBuf, out_dir: PathBuf, dialects: Vec<Dialect>) -> Result<()> {
    let dialects = selected_dialects(&dialects);
    let queries = super::load_queries(&file, &dialects)?;

    for path in write_batches(&queries, &dialects, &out_dir)? {
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparqlbench_query::Transpiler;
    use tempfile::TempDir;

    #[test]
    fn test_write_batches_and_manifest() {
        let temp = TempDir::new().unwrap();
        let file = QueryFile::parse(
            "q1\tSELECT ?x WHERE { ?x <is-a> <City> } OFFSET 2\nq2\tSELECT ?x WHERE { ?x <p> ?y }\n",
            &Transpiler::default(),
        );

        let written = write_batches(&file, &[Dialect::Rdf3x, Dialect::BifContains], temp.path()).unwrap();
        assert_eq!(written.len(), 2);

        let rdf3x = std::fs::read_to_string(temp.path().join("rdf3x.queries")).unwrap();
        assert_eq!(rdf3x, "SELECT ?x WHERE { ?x <p> ?y }\n");

        let bifc = std::fs::read_to_string(temp.path().join("bif-contains.queries")).unwrap();
        assert!(bifc.lines().all(|l| l.starts_with("SPARQL ") && l.ends_with(';')));

        let manifest: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(temp.path().join(SKIPPED_MANIFEST)).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["rdf3x"][0]["id"], "q1");
        assert_eq!(manifest["rdf3x"][0]["line"], 1);
        assert_eq!(manifest["bif-contains"], serde_json::json!([]));
    }
}
