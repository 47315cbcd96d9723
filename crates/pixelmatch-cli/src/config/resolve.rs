use std::path::PathBuf;

use anyhow::{Context, Result};
use pixelmatch::MatchOptions;

use super::diff::DiffConfig;
use super::load;
use crate::output::Destination;

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub dest: Option<PathBuf>,
    pub no_output: bool,
    pub jobs: Option<usize>,
    pub diff: DiffConfig,
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedRunConfig {
    pub options: MatchOptions,
    /// `None` when only the count is wanted.
    pub destination: Option<Destination>,
    pub jobs: Option<usize>,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        Self::resolve(cli, |name| std::env::var(name).ok())
    }

    pub fn resolve(cli: CliOverrides, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // 1. File layer
        let file_config = load(cli.config.as_deref())?;

        // 2. Env layer
        let env_diff = DiffConfig::from_lookup(env)?;

        // 3. Overlay env, then CLI, onto the file values
        let mut diff = file_config.diff;
        diff.merge(&env_diff);
        diff.merge(&cli.diff);
        let options = diff.to_options().context("Invalid comparison settings")?;

        let destination = if cli.no_output {
            None
        } else {
            let path = cli
                .dest
                .or(file_config.output.dest)
                .unwrap_or_else(|| PathBuf::from("-"));
            Some(Destination::from_path(path)?)
        };

        Ok(Self {
            options,
            destination,
            jobs: cli.jobs,
        })
    }
}
