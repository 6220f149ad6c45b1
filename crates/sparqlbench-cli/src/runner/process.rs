//! Engines driven as a child process over a batch file.

use super::output::{parse_isql_output, parse_native_output, parse_rdf3x_output};
use super::{Measurement, QueryRunner};
use crate::batch::DialectBatch;
use crate::config::{NativeConfig, Rdf3xConfig, VirtuosoConfig};
use crate::error::{OutputParseError, RunnerError};
use async_trait::async_trait;
use sparqlbench_query::Dialect;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

type OutputParser = fn(&str) -> Result<Vec<Measurement>, OutputParseError>;

/// Runs `program <args…> <batch file>` and parses its stdout
pub struct ProcessRunner {
    dialect: Dialect,
    program: PathBuf,
    args: Vec<OsString>,
    parse: OutputParser,
}

impl ProcessRunner {
    pub fn new(
        dialect: Dialect,
        program: impl Into<PathBuf>,
        args: Vec<OsString>,
        parse: OutputParser,
    ) -> Self {
        Self {
            dialect,
            program: program.into(),
            args,
            parse,
        }
    }

    /// `isql <port> <user> <password> <file>` for a Virtuoso dialect
    pub fn isql(dialect: Dialect, config: &VirtuosoConfig, password: &str) -> Self {
        let port = match dialect {
            Dialect::BifContainsIncremental => config.bifc_inc_port,
            _ => config.bifc_port,
        };
        Self::new(
            dialect,
            &config.isql_binary,
            vec![
                port.to_string().into(),
                config.user.clone().into(),
                password.into(),
            ],
            parse_isql_output,
        )
    }

    /// `rdf3xquery <database> <file>`
    pub fn rdf3x(config: &Rdf3xConfig) -> Self {
        Self::new(
            Dialect::Rdf3x,
            &config.binary,
            vec![config.database.clone().into()],
            parse_rdf3x_output,
        )
    }

    /// `<binary> -i <index> -t --queryfile <file>`
    pub fn native(config: &NativeConfig) -> Self {
        Self::new(
            Dialect::Native,
            &config.binary,
            vec![
                "-i".into(),
                config.index.clone().into(),
                "-t".into(),
                "--queryfile".into(),
            ],
            parse_native_output,
        )
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl QueryRunner for ProcessRunner {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn run(&self, batch: &DialectBatch) -> Result<Vec<Measurement>, RunnerError> {
        let mut file = tempfile::Builder::new()
            .prefix("sqb-")
            .suffix(&format!(".{}", batch.file_name()))
            .tempfile()?;
        file.write_all(batch.file_contents().as_bytes())?;
        file.flush()?;

        info!(dialect = %self.dialect, queries = batch.lines.len(), program = %self.program_name(), "running batch");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                program: self.program_name(),
                source,
            })?;

        if !output.status.success() {
            return Err(RunnerError::Exit {
                program: self.program_name(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(dialect = %self.dialect, bytes = stdout.len(), "engine finished");
        Ok((self.parse)(&stdout)?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::batch::QueryFile;
    use sparqlbench_query::Transpiler;

    fn batch(dialect: Dialect) -> DialectBatch {
        let file = QueryFile::parse(
            "q1\tSELECT ?x WHERE { ?x <is-a> <City> }\nq2\tSELECT ?x WHERE { ?x <p> ?y }\n",
            &Transpiler::default(),
        );
        DialectBatch::build(dialect, &file)
    }

    /// A fake engine: `sh -c <script> sh <batch file>`
    fn shell(dialect: Dialect, script: &str, parse: OutputParser) -> ProcessRunner {
        ProcessRunner::new(dialect, "sh", vec!["-c".into(), script.into(), "sh".into()], parse)
    }

    #[tokio::test]
    async fn test_runner_reads_batch_file() {
        // One `Done` marker per query line in the batch file
        let runner = shell(
            Dialect::Rdf3x,
            r#"while read -r line; do echo; echo row; echo "Done. Time: 2 ms"; done < "$1""#,
            parse_rdf3x_output,
        );

        let measurements = runner.run(&batch(Dialect::Rdf3x)).await.unwrap();
        assert_eq!(
            measurements,
            vec![
                Measurement::Measured { elapsed_ms: 2.0, rows: 1 },
                Measurement::Measured { elapsed_ms: 2.0, rows: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_runner_passes_isql_arguments() {
        let config = VirtuosoConfig {
            isql_binary: "echo".into(),
            ..VirtuosoConfig::default()
        };
        let runner = ProcessRunner::isql(Dialect::BifContainsIncremental, &config, "secret");
        assert_eq!(
            runner.args,
            vec![OsString::from("1114"), OsString::from("dba"), OsString::from("secret")]
        );

        // `echo` prints its arguments, none of which is a row marker
        let measurements = runner.run(&batch(Dialect::BifContainsIncremental)).await.unwrap();
        assert!(measurements.is_empty());
    }

    #[tokio::test]
    async fn test_runner_failing_engine() {
        let runner = shell(Dialect::Native, "echo boom >&2; exit 3", parse_native_output);

        match runner.run(&batch(Dialect::Native)).await {
            Err(RunnerError::Exit { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected exit error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_runner_missing_binary() {
        let runner = ProcessRunner::new(
            Dialect::Native,
            "/nonexistent/engine",
            Vec::new(),
            parse_native_output,
        );
        let result = runner.run(&batch(Dialect::Native)).await;
        assert!(matches!(result, Err(RunnerError::Spawn { .. })));
    }
}
