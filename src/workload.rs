use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::handlers::graphql;
use crate::AppState;

/// One spawned generator and the signal that stops it.
pub struct WorkloadRun {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

// ─── Lifecycle ───────────────────────────────────────────────────

/// Spawn the generator. Returns `false` if it is already running.
pub async fn start(state: &Arc<AppState>) -> bool {
    let mut current = state.workload_run.lock().await;
    if current.is_some() {
        return false;
    }

    // Each run owns its stop channel; a later run can never revive this one
    let (stop, stop_rx) = watch::channel(false);
    let task_state = Arc::clone(state);
    let handle = tokio::spawn(async move { run(task_state, stop_rx).await });

    *current = Some(WorkloadRun { stop, handle });
    true
}

/// Signal the generator and wait for it. Returns `false` if it was idle.
pub async fn stop(state: &AppState) -> bool {
    let mut current = state.workload_run.lock().await;
    let Some(run) = current.take() else {
        return false;
    };

    // A send error only means the task is already gone
    let _ = run.stop.send(true);
    // Ignore JoinError — the task may have already finished
    let _ = run.handle.await;

    tracing::info!("workload generator stopped");
    true
}

pub async fn is_running(state: &AppState) -> bool {
    state.workload_run.lock().await.is_some()
}

// ─── Generator loop ──────────────────────────────────────────────

/// Every tick: one synthetic request for a random operation, then a new
/// random value for the active sessions gauge.
async fn run(state: Arc<AppState>, mut stop: watch::Receiver<bool>) {
    let cfg = state.workload.clone();
    let period = Duration::from_millis(cfg.interval_ms);

    // First request goes out one full period after start.
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(ticker);

    let mut rng = StdRng::from_entropy();

    tracing::info!(
        interval_ms = cfg.interval_ms,
        operations = cfg.operations.len(),
        "workload generator started"
    );

    loop {
        tokio::select! {
            // Stop requested, or the sender was dropped
            _ = stop.changed() => break,
            tick = ticks.next() => {
                if tick.is_none() {
                    break;
                }
            }
        }

        let operation = &cfg.operations[rng.gen_range(0..cfg.operations.len())];
        let sessions = rng.gen_range(cfg.active_sessions_min..cfg.active_sessions_max);

        match graphql::execute(&state, operation).await {
            Ok(_) => tracing::debug!(operation = %operation, "synthetic request ok"),
            Err(_) => tracing::debug!(operation = %operation, "synthetic request failed"),
        }

        if let Err(e) = state.telemetry.set_active_sessions(f64::from(sessions)) {
            tracing::error!(error = %e, "failed to set active sessions");
        }
    }
}
