//! Serializable run configuration.
//!
//! A run file names where the bars come from, the strategy to replay over
//! them, and where to write results. TOML and JSON are both accepted; the
//! format follows the file extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vwzlab_core::config::{ConfigError, StrategyConfig};

use crate::data_loader::LoadOptions;
use crate::synthetic::SyntheticSpec;

/// Content hash identifying a run's inputs.
pub type RunId = String;

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension '{0}' (expected .toml or .json)")]
    UnsupportedExtension(String),
    #[error("invalid strategy: {0}")]
    Strategy(#[from] ConfigError),
    #[error("no data source: set data.bars or data.synthetic")]
    NoDataSource,
}

/// Configuration for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Bar source. A CSV path wins over the synthetic generator when both are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub bars: Option<PathBuf>,
    #[serde(default)]
    pub synthetic: Option<SyntheticSpec>,
    #[serde(default)]
    pub load: LoadOptions,
}

/// Export destinations; each artifact is skipped when its path is unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub trades_csv: Option<PathBuf>,
    pub snapshots_jsonl: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}

impl RunConfig {
    /// Load from a `.toml` or `.json` file and validate.
    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            other => Err(RunConfigError::UnsupportedExtension(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, RunConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, RunConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        self.strategy.validate()?;
        if self.data.bars.is_none() && self.data.synthetic.is_none() {
            return Err(RunConfigError::NoDataSource);
        }
        Ok(())
    }

    /// BLAKE3 over the data source and strategy. Output paths do not
    /// change what a run computes and are left out.
    pub fn run_id(&self) -> RunId {
        strategy_run_id(&self.data, &self.strategy)
    }
}

/// Run id for `strategy` replayed over the bars described by `data`.
pub fn strategy_run_id(data: &DataConfig, strategy: &StrategyConfig) -> RunId {
    // plain structs with string keys always serialize
    let json = serde_json::to_vec(&(data, strategy)).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}
