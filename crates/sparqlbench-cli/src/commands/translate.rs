//! `sqb translate`: per-query, per-dialect outcomes

use crate::batch::QueryFile;
use crate::cli::{selected_dialects, OutputFormat};
use anyhow::Result;
use serde::Serialize;
use sparqlbench_query::{Dialect, TranslationOutcome};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

/// One printed line: a dialect outcome, or a parse failure for the line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "id")]
    pub id: String,
    #[tabled(rename = "dialect")]
    pub dialect: String,
    #[tabled(rename = "outcome")]
    pub outcome: &'static str,
    #[tabled(rename = "text")]
    pub text: String,
}

/// Flatten the file into one row per (line, dialect)
pub fn outcome_rows(file: &QueryFile, dialects: &[Dialect]) -> Vec<OutcomeRow> {
    let mut rows = Vec::new();
    for entry in &file.entries {
        match &entry.translation {
            Ok(translation) => {
                for dialect in dialects {
                    let (outcome, text) = match translation.outcome(*dialect) {
                        Some(TranslationOutcome::Rewritten(text)) => ("rewritten", text.clone()),
                        Some(TranslationOutcome::Inexpressible(reason)) => {
                            ("inexpressible", reason.clone())
                        }
                        None => continue,
                    };
                    rows.push(OutcomeRow {
                        id: translation.id.clone(),
                        dialect: dialect.to_string(),
                        outcome,
                        text,
                    });
                }
            }
            Err(err) => rows.push(OutcomeRow {
                id: entry.id(),
                dialect: "-".to_string(),
                outcome: "malformed",
                text: err.to_string(),
            }),
        }
    }
    rows
}

pub fn render(rows: &[OutcomeRow], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(rows)?,
        OutputFormat::Tsv => {
            let mut out = String::from("id\tdialect\toutcome\ttext\n");
            for row in rows {
                // keep one record per line
                let text = row.text.replace(['\t', '\n'], " ");
                out.push_str(&format!("{}\t{}\t{}\t{}\n", row.id, row.dialect, row.outcome, text));
            }
            out
        }
    })
}

/// Execute translate command
pub async fn execute(file: PathBuf, dialects: Vec<Dialect>, format: OutputFormat) -> Result<()> {
    let dialects = selected_dialects(&dialects);
    let queries = super::load_queries(&file, &dialects)?;

    let rows = outcome_rows(&queries, &dialects);
    println!("{}", render(&rows, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparqlbench_query::Transpiler;

    fn rows() -> Vec<OutcomeRow> {
        let dialects = [Dialect::Rdf3x, Dialect::Broccoli];
        let file = QueryFile::parse(
            "q1\tSELECT ?x ?y WHERE { ?x <p> ?y }\nbad\tSELECT ?x { }\n",
            &Transpiler::with_dialects(&dialects),
        );
        outcome_rows(&file, &dialects)
    }

    #[test]
    fn test_rows_per_dialect_and_malformed() {
        let rows = rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].dialect, "rdf3x");
        assert_eq!(rows[0].outcome, "rewritten");
        assert_eq!(rows[1].outcome, "inexpressible");
        assert!(rows[1].text.contains("multi-variable projection"));
        assert_eq!(rows[2].id, "bad");
        assert_eq!(rows[2].outcome, "malformed");
    }

    #[test]
    fn test_render_tsv() {
        let tsv = render(&rows(), OutputFormat::Tsv).unwrap();
        let first = tsv.lines().nth(1).unwrap();
        assert_eq!(first, "q1\trdf3x\trewritten\tSELECT ?x ?y WHERE { ?x <p> ?y }");
    }

    #[test]
    fn test_render_json() {
        let json: serde_json::Value =
            serde_json::from_str(&render(&rows(), OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[1]["dialect"], "broccoli");
        assert_eq!(json[2]["outcome"], "malformed");
    }
}
