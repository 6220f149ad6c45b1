//! Query files and per-dialect batches.
//!
//! A query file holds one `id<TAB>query` per line. Every line is translated
//! once; each dialect then gets a batch of the lines it can express, in file
//! order, plus the set of line indices it had to skip.

use sparqlbench_query::{Dialect, LineTranslation, ParseError, TranslationOutcome, Transpiler};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// One non-blank line of a query file
#[derive(Debug, Clone)]
pub struct QueryEntry {
    /// 1-based line number in the source file
    pub line_no: usize,
    /// The trimmed source line
    pub text: String,
    pub translation: Result<LineTranslation, ParseError>,
}

impl QueryEntry {
    /// Query id, or the line number when the line did not parse
    pub fn id(&self) -> String {
        match &self.translation {
            Ok(translation) => translation.id.clone(),
            Err(_) => self
                .text
                .split_once('\t')
                .map(|(id, _)| id.trim().to_string())
                .unwrap_or_else(|| format!("line {}", self.line_no)),
        }
    }

    /// The query text without its id
    pub fn query_text(&self) -> &str {
        self.text
            .split_once('\t')
            .map(|(_, query)| query.trim())
            .unwrap_or(&self.text)
    }

    pub fn outcome(&self, dialect: Dialect) -> Option<&TranslationOutcome> {
        self.translation.as_ref().ok()?.outcome(dialect)
    }
}

/// All translated lines of one input file
#[derive(Debug, Clone, Default)]
pub struct QueryFile {
    pub entries: Vec<QueryEntry>,
}

impl QueryFile {
    pub fn read(path: &Path, transpiler: &Transpiler) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content, transpiler))
    }

    /// Translate every non-blank line. Parse failures stay in the file as
    /// entries so row positions line up with the source.
    pub fn parse(content: &str, transpiler: &Transpiler) -> Self {
        let entries = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                let line_no = index + 1;
                let translation = transpiler.translate_line(line);
                if let Err(err) = &translation {
                    warn!(line = line_no, "{}", err);
                }
                QueryEntry {
                    line_no,
                    text: line.trim().to_string(),
                    translation,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The lines one engine will run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectBatch {
    pub dialect: Dialect,
    /// Engine-ready lines for the accepted queries, in file order
    pub lines: Vec<String>,
    /// Entry indices that are not in `lines`
    pub skipped: BTreeSet<usize>,
    /// Number of entries in the source file
    pub total: usize,
}

impl DialectBatch {
    pub fn build(dialect: Dialect, file: &QueryFile) -> Self {
        let mut lines = Vec::new();
        let mut skipped = BTreeSet::new();

        for (index, entry) in file.entries.iter().enumerate() {
            match entry.outcome(dialect).and_then(TranslationOutcome::rewritten) {
                Some(text) => lines.push(Self::wrap(dialect, text)),
                None => {
                    skipped.insert(index);
                }
            }
        }
        debug!(%dialect, accepted = lines.len(), skipped = skipped.len(), "built batch");

        Self {
            dialect,
            lines,
            skipped,
            total: file.len(),
        }
    }

    /// Virtuoso's isql needs each query as a `SPARQL …;` statement
    pub fn wrap(dialect: Dialect, query: &str) -> String {
        if dialect.is_virtuoso() {
            format!("SPARQL {};", query)
        } else {
            query.to_string()
        }
    }

    /// Batch file body, one line per query
    pub fn file_contents(&self) -> String {
        let mut out = self.lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn file_name(&self) -> String {
        format!("{}.queries", self.dialect)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
