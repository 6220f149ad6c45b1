use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use sparqlbench_cli::{
    cli::{Cli, Commands},
    commands,
    config::BenchConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let env_filter = match cli.level_filter() {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Translate {
            file,
            dialects,
            format,
        } => commands::translate::execute(file, dialects, format).await,
        Commands::Emit {
            file,
            out_dir,
            dialects,
        } => commands::emit::execute(file, out_dir, dialects).await,
        Commands::Bench {
            file,
            virtuoso_pwd,
            dialects,
            format,
        } => {
            let config = BenchConfig::load(cli.config.as_deref())?;
            commands::bench::execute(config, file, virtuoso_pwd, dialects, format).await
        }
    }
}
