pub mod diff;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::diff::DiffConfig;
pub use self::resolve::{CliOverrides, ResolvedRunConfig};

/// Looked up in the working directory when `--config` is not given.
pub(crate) const CONFIG_FILE: &str = "pixelmatch.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the diff image goes when `--dest` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        if let Some(v) = self.diff.threshold {
            validate_unit(v).map_err(|e| anyhow!("diff.threshold {e}"))?;
        }
        if let Some(v) = self.diff.alpha {
            validate_unit(v).map_err(|e| anyhow!("diff.alpha {e}"))?;
        }
        Ok(())
    }
}

pub fn validate_unit(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

/// clap value parser for settings in `0.0..=1.0`.
pub fn parse_unit(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_unit(v)
}

pub fn parse(content: &str, origin: &Path) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .with_context(|| format!("Failed to parse {}", origin.display()))?;
    config.validate()?;
    Ok(config)
}

/// Read the config file. An explicit path must exist; the default
/// `pixelmatch.toml` is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if !default.exists() {
                debug!("no {CONFIG_FILE} found, using defaults");
                return Ok(Config::default());
            }
            default
        }
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!(path = %path.display(), "loaded config file");
    parse(&content, &path)
}
