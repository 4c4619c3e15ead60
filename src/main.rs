/*!
 * tick-sim Server - Main Entry Point
 *
 * Discrete-time CPU scheduling simulator:
 * - Five scheduling policies (FCFS, SJF, SRTF, Priority, Round-Robin)
 * - Periodic clock driver advancing the simulation
 * - Line-delimited JSON protocol for any number of remote observers
 */

use anyhow::Context;
use std::time::Duration;
use tick_sim::core::limits::{DEFAULT_ADDR, DEFAULT_TICK_INTERVAL};
use tick_sim::gen::Workload;
use tick_sim::sim::SimulationEngine;
use tick_sim::{serve, Coordinator};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize structured tracing; `log` records are bridged in
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("TICKSIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        // JSON output for production/parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::FULL),
            )
            .init();
    } else {
        // Human-readable output for development
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("tick-sim server starting...");

    let addr = std::env::var("TICKSIM_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let tick_interval = std::env::var("TICKSIM_TICK_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TICK_INTERVAL);

    let coordinator = Coordinator::new(SimulationEngine::new());

    // Optionally seed a demo workload so the server has work out of the box
    if let Ok(name) = std::env::var("TICKSIM_WORKLOAD") {
        match name.parse::<Workload>() {
            Ok(workload) => {
                for spec in workload.processes() {
                    if let Err(e) = coordinator.add_process(spec) {
                        warn!(error = %e, "Skipping seeded process");
                    }
                }
                info!(workload = %name, "Seeded demo workload");
            }
            Err(()) => warn!(workload = %name, "Unknown workload name, ignoring"),
        }
    }

    let driver = coordinator.spawn_driver(tick_interval);
    info!(interval_ms = tick_interval.as_millis() as u64, "Clock driver running");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "Accepting observer connections");

    tokio::select! {
        result = serve(listener, coordinator) => {
            result.context("server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    driver.shutdown().await;
    info!("tick-sim server stopped");
    Ok(())
}
