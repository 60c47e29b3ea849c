//! Service configuration (strict YAML, every field defaulted).

pub mod schema;

use std::fs;

use thiserror::Error;

pub use schema::{AppConfig, SimulationConfig, WorkloadConfig};

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "GRAPHQL_METRICS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config '{path}' failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load from the file named by `GRAPHQL_METRICS_CONFIG`, or defaults.
pub fn load() -> Result<AppConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => load_from_file(&path),
        _ => {
            let cfg = AppConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = serde_yaml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}
