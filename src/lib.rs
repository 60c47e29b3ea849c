//! GraphQL request telemetry: a label-keyed metrics core plus the HTTP
//! surface and synthetic workload that exercise it.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod telemetry;
pub mod workload;

use config::{AppConfig, SimulationConfig, WorkloadConfig};
use metrics::{Exporter, Recorder, Registry, SeriesStore};
use telemetry::GraphqlTelemetry;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Records classified requests into the metrics store.
    pub telemetry: GraphqlTelemetry,

    /// Renders the store for `/metrics`.
    pub exporter: Exporter,

    pub simulation: SimulationConfig,
    pub workload: WorkloadConfig,

    /// The live generator, if any. Start and stop both hold this lock for
    /// their whole duration, so they never interleave.
    pub workload_run: tokio::sync::Mutex<Option<workload::WorkloadRun>>,
}

impl AppState {
    /// Register the GraphQL metrics and wire registry, store, recorder and
    /// exporter together.
    pub fn new(config: &AppConfig) -> error::Result<Self> {
        let mut registry = Registry::new();
        telemetry::register(&mut registry)?;

        let store = Arc::new(SeriesStore::new(Arc::new(registry)));

        Ok(Self {
            telemetry: GraphqlTelemetry::new(Recorder::new(Arc::clone(&store))),
            exporter: Exporter::new(store),
            simulation: config.simulation.clone(),
            workload: config.workload.clone(),
            workload_run: tokio::sync::Mutex::new(None),
        })
    }
}
