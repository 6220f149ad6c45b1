//! Benchmark report: one row per query, one timing column per engine.

use crate::batch::QueryFile;
use crate::runner::Measurement;
use indexmap::IndexMap;
use serde::Serialize;
use sparqlbench_query::Dialect;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Report columns after `id` and `query`, in display order
pub const COLUMNS: [(Dialect, &str); 5] = [
    (Dialect::BifContains, "bifc"),
    (Dialect::BifContainsIncremental, "bifc_inc"),
    (Dialect::Rdf3x, "rdf3x"),
    (Dialect::Native, "native"),
    (Dialect::Broccoli, "broccoli"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub query: String,
    pub measurements: IndexMap<Dialect, Measurement>,
}

impl ReportRow {
    /// Row counts per dialect when measured engines disagree, else `None`.
    ///
    /// Skipped and missing cells are ignored.
    pub fn disagreement(&self) -> Option<Vec<(Dialect, u64)>> {
        let counts: Vec<(Dialect, u64)> = COLUMNS
            .iter()
            .filter_map(|(dialect, _)| {
                let rows = self.measurements.get(dialect)?.rows()?;
                Some((*dialect, rows))
            })
            .collect();
        let first = counts.first()?.1;
        counts
            .iter()
            .any(|(_, rows)| *rows != first)
            .then_some(counts)
    }

    fn cell(&self, dialect: Dialect) -> String {
        self.measurements
            .get(&dialect)
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Join aligned per-dialect measurements with the query file.
    ///
    /// Every measurement vector must have one entry per file entry; dialects
    /// absent from `columns` show as skipped.
    pub fn build(file: &QueryFile, columns: &IndexMap<Dialect, Vec<Measurement>>) -> Self {
        let rows = file
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let measurements = COLUMNS
                    .iter()
                    .map(|(dialect, _)| {
                        let cell = columns
                            .get(dialect)
                            .and_then(|column| column.get(index))
                            .copied()
                            .unwrap_or(Measurement::Skipped);
                        (*dialect, cell)
                    })
                    .collect();
                ReportRow {
                    id: entry.id(),
                    query: entry.query_text().to_string(),
                    measurements,
                }
            })
            .collect();
        Self { rows }
    }

    /// Rows whose measured counts disagree
    pub fn disagreements(&self) -> impl Iterator<Item = (&ReportRow, Vec<(Dialect, u64)>)> {
        self.rows
            .iter()
            .filter_map(|row| row.disagreement().map(|counts| (row, counts)))
    }

    fn header() -> Vec<String> {
        ["id", "query"]
            .into_iter()
            .chain(COLUMNS.iter().map(|(_, name)| *name))
            .map(str::to_string)
            .collect()
    }

    fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(|row| {
            [row.id.clone(), row.query.clone()]
                .into_iter()
                .chain(COLUMNS.iter().map(|(dialect, _)| row.cell(*dialect)))
                .collect()
        })
    }

    pub fn to_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(Self::header());
        for record in self.records() {
            builder.push_record(record);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for record in std::iter::once(Self::header()).chain(self.records()) {
            out.push_str(&record.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `a vs b vs c` summary of disagreeing counts
pub fn format_counts(counts: &[(Dialect, u64)]) -> String {
    counts
        .iter()
        .map(|(dialect, rows)| format!("{}={}", dialect, rows))
        .collect::<Vec<_>>()
        .join(" vs ")
}
