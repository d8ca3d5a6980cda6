//! Headless Game of Life runner: ticks the simulation, exports snapshots,
//! and restarts with a fresh grid every few exports.

mod client;
mod telemetry;

use anyhow::Result;
use client::SnapshotSink;
use life_core::RunnerConfig;
use life_world::{Clock, MonotonicClock, Session, SessionEvent};
use std::future::Future;
use tokio::signal;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let config = RunnerConfig::from_env()?;

    // Initialize telemetry
    telemetry::init_telemetry(config.otel_endpoint.as_deref())?;

    info!("Starting Life runner");

    let sink = SnapshotSink::from_config(&config)?;
    info!("Snapshots go to {}", sink.describe());

    let clock = MonotonicClock::new();
    let session = Session::new(&config.simulation, clock.now());

    run_session(session, &clock, &sink, shutdown_signal()).await?;

    // Shutdown telemetry
    telemetry::shutdown_telemetry();

    Ok(())
}

/// Sleep until the next task is due, run everything due, deliver snapshots.
/// Returns once `shutdown` completes.
async fn run_session(
    mut session: Session,
    clock: &MonotonicClock,
    sink: &SnapshotSink,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    tokio::pin!(shutdown);

    loop {
        let deadline = Instant::from_std(clock.instant_at(session.next_deadline()));

        tokio::select! {
            _ = &mut shutdown => break,
            _ = sleep_until(deadline) => {}
        }

        for event in session.run_due(clock.now())? {
            match event {
                SessionEvent::Exported(snapshot) => {
                    // Delivery failures are not fatal; the next cycle tries again
                    if let Err(e) = sink.deliver(&snapshot).await {
                        error!("Failed to deliver snapshot: {}", e);
                    }
                }
                SessionEvent::Reset => {
                    info!(resets = session.resets(), "Simulation restarted");
                }
                SessionEvent::Ticked { .. } => {}
            }
        }
    }

    info!(
        generation = session.simulation().generation(),
        resets = session.resets(),
        "Runner stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
