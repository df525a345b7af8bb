// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! NEMI - Simulated Factory Inspection Intelligence Engine
//!
//! Headless console for the NEMI engine. Starts the simulation, logs a
//! dashboard status line every tick and optionally runs federated rounds.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use nemi::core::{EventBus, EventKind, EventPayload};
use nemi::views::{Dashboard, FederatedLearning, TemporalAnalysis};
use nemi::{Config, Engine, VERSION};

/// NEMI - Simulated Factory Inspection Intelligence Engine
#[derive(Parser, Debug)]
#[command(name = "nemi")]
#[command(author = "NEMI Project")]
#[command(version = VERSION)]
#[command(about = "Simulated edge inspection and federated learning engine")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation tick interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many seconds (0 = until Ctrl+C)
    #[arg(long, default_value = "0")]
    duration_secs: u64,

    /// Run a federated learning round every N ticks (0 = never)
    #[arg(long, default_value = "0")]
    learning_every: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Initialize logging: --trace/--debug, then RUST_LOG, then the config file
    let (filter, filter_error) = if args.trace {
        (EnvFilter::new("trace"), None)
    } else if args.debug {
        (EnvFilter::new("debug"), None)
    } else if let Ok(filter) = EnvFilter::try_from_default_env() {
        (filter, None)
    } else {
        match config.log_filter() {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new("info"), Some(e)),
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{} v{} - Simulated Factory Inspection Intelligence", config.app_name, VERSION);
    if let Some(e) = filter_error {
        warn!("{}; falling back to info", e);
    }

    // Override with command line args
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(interval) = args.interval_ms {
        config.simulation.interval_ms = interval;
    }

    info!("Configuration loaded from {:?}", config_path);
    match config.simulation.seed {
        Some(seed) => info!("Deterministic run, seed {}", seed),
        None => info!("Seeding from entropy"),
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_headless(config, &args))
}

async fn run_headless(config: Config, args: &Args) -> Result<()> {
    let engine = Arc::new(Engine::new(config));
    let tick_interval = engine.config.simulation.interval();

    tokio::spawn(log_events(engine.event_bus().clone()));

    engine.init_model().await?;

    let mut dashboard = Dashboard::new(engine.clone());
    let mut federated = FederatedLearning::new(engine.clone());
    let temporal = TemporalAnalysis::new(engine.clone());
    temporal.publish()?;
    for summary in temporal.summaries() {
        debug!(
            "{}: avg {:.3}, {} anomalies ({:?})",
            summary.scale, summary.average, summary.anomalies, summary.status
        );
    }

    engine.start_system();
    info!("Press Ctrl+C to shutdown");

    let deadline = async {
        if args.duration_secs == 0 {
            std::future::pending::<()>().await
        } else {
            tokio::time::sleep(Duration::from_secs(args.duration_secs)).await
        }
    };
    tokio::pin!(deadline);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.tick().await;
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                info!("Shutdown signal received, cleaning up...");
                break;
            }
            _ = &mut deadline => {
                info!("Run duration elapsed");
                break;
            }
            _ = ticker.tick() => {
                ticks += 1;
                dashboard.tick(Utc::now());
                info!("{}", dashboard.summary().status_line());

                if args.learning_every == 0 || ticks % args.learning_every != 0 {
                    continue;
                }
                match learning_round(&mut federated, &mut shutdown, &mut deadline).await? {
                    Some(Stop::Shutdown) => {
                        info!("Shutdown signal received during learning round, cleaning up...");
                        break;
                    }
                    Some(Stop::Deadline) => {
                        info!("Run duration elapsed during learning round");
                        break;
                    }
                    None => {}
                }
            }
        }
    }

    engine.stop_system();
    let status = engine.status();
    info!(
        "Final: {} detections, {} learning rounds, accuracy {:.1}%, {} driver ticks",
        status.total_detections, status.learning_rounds, status.global_accuracy, status.driver_ticks
    );
    info!("NEMI shutdown complete");

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Stop {
    Shutdown,
    Deadline,
}

/// Run one federated round unless shutdown or the deadline fires first.
/// An interrupted round is dropped and leaves the store untouched.
async fn learning_round<S, D>(federated: &mut FederatedLearning, shutdown: &mut S, deadline: &mut D) -> Result<Option<Stop>>
where
    S: Future<Output = std::io::Result<()>> + Unpin,
    D: Future<Output = ()> + Unpin,
{
    tokio::select! {
        round = federated.run_round() => {
            if let Some(round) = round {
                info!(
                    "Round {}: {} participants, privacy budget {:.2}",
                    round.round, round.participating_nodes, round.privacy_budget
                );
            }
            Ok(None)
        }
        result = shutdown => {
            result?;
            Ok(Some(Stop::Shutdown))
        }
        _ = deadline => Ok(Some(Stop::Deadline)),
    }
}

/// Surface alerts and errors published by the engine and views
async fn log_events(bus: Arc<EventBus>) {
    let mut events = bus.subscribe_to(&[EventKind::Alert, EventKind::Error]);
    loop {
        match events.recv().await {
            Ok(event) => match event.payload {
                EventPayload::Alert { level, message } => warn!("[{}] {}", level, message),
                EventPayload::Error { code, message } => error!("error {}: {}", code, message),
                _ => {}
            },
            Err(RecvError::Lagged(n)) => debug!("event log lagged by {} events", n),
            Err(RecvError::Closed) => break,
        }
    }
}
