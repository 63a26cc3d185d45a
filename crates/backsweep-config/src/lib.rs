//! Experiment configuration: the declarative TOML shape an experiment is
//! described by, and the loader that turns a file on disk into it.
//!
//! Layers `config::Config` over a TOML file and validates the result before
//! handing an [`ExperimentConfig`] to the rest of the workspace.

use std::path::{Path, PathBuf};

use backsweep_sampler::{ParameterSpace, SampleMethod};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// `data.*` table: source path plus format hints that are currently
/// advisory (the streamer only understands CSV today).
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_schema_type")]
    pub schema_type: String,
}

fn default_format() -> String {
    "csv".to_string()
}

fn default_schema_type() -> String {
    "l1_quote".to_string()
}

/// `optimization.*` table. `parallel_workers` is advisory for the embarrassingly
/// parallel multi-experiment path (§5); a single `run_experiment` call is
/// always single-threaded across strategies within its own run.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizationConfig {
    pub method: SampleMethod,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_parallel_workers")]
    pub parallel_workers: usize,
}

fn default_samples() -> usize {
    10
}

fn default_parallel_workers() -> usize {
    1
}

impl OptimizationConfig {
    /// Project onto the sampler's own config shape, dropping the
    /// engine-level `parallel_workers` field the sampler has no use for.
    pub fn to_sampler_config(&self) -> backsweep_sampler::SamplerConfig {
        backsweep_sampler::SamplerConfig {
            method: self.method,
            samples: self.samples,
            seed: self.seed,
        }
    }
}

/// Full shape of an experiment TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default = "default_experiment_name")]
    pub experiment_name: String,
    pub strategy: String,
    pub data: DataConfig,
    pub optimization: OptimizationConfig,
    pub parameters: ParameterSpace,
    #[serde(default)]
    pub constraints: IndexMap<String, f64>,
}

fn default_experiment_name() -> String {
    "unnamed".to_string()
}

/// Errors raised loading or validating an [`ExperimentConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),
    #[error("optimization.samples must be >= 1, got {0}")]
    ZeroSamples(usize),
    #[error("optimization.parallel_workers must be >= 1, got {0}")]
    ZeroParallelWorkers(usize),
}

impl ExperimentConfig {
    /// Load and validate an experiment config from a TOML file at `path`.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }
        let settings = config::Config::builder()
            .add_source(config::File::from(path_ref))
            .build()?;
        let parsed: Self = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.optimization.samples == 0 {
            return Err(ConfigError::ZeroSamples(0));
        }
        if self.optimization.parallel_workers == 0 {
            return Err(ConfigError::ZeroParallelWorkers(0));
        }
        Ok(())
    }
}
