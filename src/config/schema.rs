use std::net::SocketAddr;

use serde::Deserialize;

use super::{ConfigError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Directory holding the documentation page served at `/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub workload: WorkloadConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            static_dir: default_static_dir(),
            simulation: SimulationConfig::default(),
            workload: WorkloadConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        self.simulation.validate()?;
        self.workload.validate()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("listen '{}' is not a socket address", self.listen)))
    }
}

/// Stand-in for real request processing behind `/graphql`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Latency is drawn uniformly from `[0, max_delay_ms)`.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Probability of a simulated failure.
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,

    /// `error_type` label recorded for simulated failures.
    #[serde(default = "default_error_type")]
    pub error_type: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: default_max_delay_ms(),
            error_rate: default_error_rate(),
            error_type: default_error_type(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(ConfigError::Invalid(
                "simulation.error_rate must be between 0 and 1".into(),
            ));
        }
        if self.error_type.is_empty() {
            return Err(ConfigError::Invalid(
                "simulation.error_type must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Background traffic that keeps the metrics moving.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Active sessions gauge is drawn from `[min, max)`.
    #[serde(default = "default_sessions_min")]
    pub active_sessions_min: u32,

    #[serde(default = "default_sessions_max")]
    pub active_sessions_max: u32,

    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_interval_ms(),
            active_sessions_min: default_sessions_min(),
            active_sessions_max: default_sessions_max(),
            operations: default_operations(),
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "workload.interval_ms must be greater than 0".into(),
            ));
        }
        if self.active_sessions_max <= self.active_sessions_min {
            return Err(ConfigError::Invalid(
                "workload.active_sessions_max must be greater than active_sessions_min".into(),
            ));
        }
        if self.operations.is_empty() {
            return Err(ConfigError::Invalid(
                "workload.operations must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_static_dir() -> String {
    "static".into()
}
fn default_max_delay_ms() -> u64 {
    500
}
fn default_error_rate() -> f64 {
    0.1
}
fn default_error_type() -> String {
    "internal_error".into()
}
fn default_true() -> bool {
    true
}
fn default_interval_ms() -> u64 {
    3_000
}
fn default_sessions_min() -> u32 {
    10
}
fn default_sessions_max() -> u32 {
    50
}
fn default_operations() -> Vec<String> {
    [
        "listChaosEngines",
        "getChaosEngine",
        "createChaosEngine",
        "listWorkflows",
        "getWorkflow",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
