//! GraphQL metrics service.
//!
//! - `/graphql?operation=...` simulated, instrumented request path
//! - `/metrics` Prometheus text scrape
//! - background workload that keeps the series moving

use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use graphql_metrics::{config, server, workload, AppState};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // ── 1. Load config ───────────────────────────────────────────
    let cfg = config::load().expect("config load failed");
    let listen = cfg.listen_addr().expect("listen validated by config::load");

    // ── 2. Register metrics & build shared state ─────────────────
    let state = Arc::new(AppState::new(&cfg).expect("metric registration failed"));

    // ── 3. Background traffic ────────────────────────────────────
    if cfg.workload.enabled {
        workload::start(&state).await;
    }

    // ── 4. Build Axum router ─────────────────────────────────────
    let app = server::create_router(Arc::clone(&state), &cfg.static_dir);

    // ── 5. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .expect("failed to bind listen address");

    tracing::info!(%listen, "graphql-metrics listening");
    tracing::info!("documentation → http://{listen}/");
    tracing::info!("metrics       → http://{listen}/metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server exited with error");

    workload::stop(&state).await;
    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, run until killed.
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
