use clap::{Parser, Subcommand, ValueEnum};
use sparqlbench_query::Dialect;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors (default)
    Warn,
    /// Per-engine progress
    Info,
    /// Debug messages, including per-dialect rejections
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Output formats for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON for programmatic consumption
    Json,
    /// Tab-separated values
    Tsv,
}

#[derive(Parser)]
#[command(name = "sqb")]
#[command(about = "sqb - translate text-search SPARQL workloads and benchmark them across engines")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, RUST_LOG applies, else 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/sparqlbench/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Level requested on the command line, if any
    pub fn level_filter(&self) -> Option<LevelFilter> {
        match (self.log_level, self.verbose) {
            (Some(level), _) => Some(level.into()),
            (None, true) => Some(LevelFilter::DEBUG),
            (None, false) => None,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every query into each dialect and print the outcomes
    Translate {
        /// Query file with one `id<TAB>query` per line
        file: PathBuf,

        /// Only these dialects (can be repeated; default: all)
        #[arg(short = 'd', long = "dialect", value_parser = parse_dialect)]
        dialects: Vec<Dialect>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Write one engine-ready batch file per dialect
    Emit {
        /// Query file with one `id<TAB>query` per line
        file: PathBuf,

        /// Directory for the batch files (created if missing)
        #[arg(short = 'o', long)]
        out_dir: PathBuf,

        /// Only these dialects (can be repeated; default: all)
        #[arg(short = 'd', long = "dialect", value_parser = parse_dialect)]
        dialects: Vec<Dialect>,
    },

    /// Run the workload on every configured engine and compare timings
    Bench {
        /// Query file with one `id<TAB>query` per line
        file: PathBuf,

        /// Virtuoso password for the isql endpoints
        #[arg(long, env = "SQB_VIRTUOSO_PWD", hide_env_values = true)]
        virtuoso_pwd: Option<String>,

        /// Only these engines (can be repeated; default: all)
        #[arg(short = 'd', long = "dialect", value_parser = parse_dialect)]
        dialects: Vec<Dialect>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    s.parse().map_err(|e: sparqlbench_query::UnknownDialect| e.to_string())
}

/// The requested dialects in standard order, or all of them
pub fn selected_dialects(requested: &[Dialect]) -> Vec<Dialect> {
    Dialect::ALL
        .into_iter()
        .filter(|d| requested.is_empty() || requested.contains(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_translate_with_dialects() {
        let cli = Cli::try_parse_from([
            "sqb", "translate", "q.tsv", "-d", "rdf3x", "-d", "broccoli", "-f", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Translate {
                dialects, format, ..
            } => {
                assert_eq!(dialects, vec![Dialect::Rdf3x, Dialect::Broccoli]);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn test_unknown_dialect_rejected() {
        assert!(Cli::try_parse_from(["sqb", "translate", "q.tsv", "-d", "virtuoso"]).is_err());
    }

    #[test]
    fn test_level_filter() {
        let cli = Cli::try_parse_from(["sqb", "-v", "emit", "q.tsv", "-o", "out"]).unwrap();
        assert_eq!(cli.level_filter(), Some(LevelFilter::DEBUG));

        let cli = Cli::try_parse_from(["sqb", "emit", "q.tsv", "-o", "out", "-l", "error"]).unwrap();
        assert_eq!(cli.level_filter(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_selected_dialects_keep_standard_order() {
        assert_eq!(
            selected_dialects(&[Dialect::Broccoli, Dialect::Native]),
            vec![Dialect::Native, Dialect::Broccoli]
        );
        assert_eq!(selected_dialects(&[]), Dialect::ALL.to_vec());
    }
}
