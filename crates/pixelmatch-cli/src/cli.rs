use std::path::PathBuf;

use clap::Parser;

use crate::config::{CliOverrides, DiffConfig};

fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}

#[derive(Parser, Debug)]
#[command(
    name = "pixelmatch",
    version,
    about = "Perceptual pixel-level image comparison (exit 0 = match, 1 = differences)"
)]
pub struct Cli {
    /// Reference image
    pub left: PathBuf,
    /// Image to compare against the reference
    pub right: PathBuf,

    /// Where to write the diff image (.png, .jpg); `-` writes PNG to stdout
    #[arg(long, short = 'o', value_name = "PATH|-")]
    pub dest: Option<PathBuf>,
    /// Only count differing pixels, write no diff image
    #[arg(long, conflicts_with = "dest")]
    pub no_output: bool,
    /// Config file (default: ./pixelmatch.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Worker threads for the scan; 1 runs single-threaded
    #[arg(long, short = 'j', value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub diff: DiffConfig,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            dest: self.dest.clone(),
            no_output: self.no_output,
            jobs: self.jobs,
            diff: self.diff.clone(),
        }
    }
}
