mod cli;
mod commands;
mod config;
mod output;
mod report;

use clap::Parser;
use config::ResolvedRunConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixelmatch=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = ResolvedRunConfig::new(cli.overrides())?;
    let code = commands::compare(&cli.left, &cli.right, config)?;
    std::process::exit(code);
}
