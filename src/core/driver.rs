// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Periodic simulation driver

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::sim::{self, DriftParams, SimRng};
use crate::store::{Action, Store};

/// State shared between the driver handle and its running task
struct DriverCore {
    store: Arc<Store>,
    params: DriftParams,
    rng: Mutex<SimRng>,
    ticks: AtomicU64,
}

impl DriverCore {
    fn detect_once(&self) -> Option<Action> {
        let snapshot = self.store.snapshot();
        let action = sim::detection_trigger(&snapshot, &self.params, &mut self.rng.lock())?;
        self.store.dispatch(action.clone());
        Some(action)
    }

    fn tick(&self) -> usize {
        if !self.store.is_active() {
            return 0;
        }

        let mut dispatched = usize::from(self.detect_once().is_some());

        // drift reads the snapshot produced by the detection above
        let snapshot = self.store.snapshot();
        let updates = sim::drift_updates(&snapshot, &self.params, &mut self.rng.lock());
        dispatched += updates.len();
        for action in updates {
            self.store.dispatch(action);
        }

        self.ticks.fetch_add(1, Ordering::Relaxed);
        dispatched
    }
}

/// Owns at most one running simulation loop
pub struct SimulationDriver {
    core: Arc<DriverCore>,
    interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SimulationDriver {
    pub fn new(store: Arc<Store>, config: &SimulationConfig, rng: SimRng) -> Self {
        Self {
            core: Arc::new(DriverCore {
                store,
                params: DriftParams::from(config),
                rng: Mutex::new(rng),
                ticks: AtomicU64::new(0),
            }),
            interval: config.interval(),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the loop, replacing any loop already running.
    ///
    /// The loop ends by itself as soon as the store reports the system
    /// inactive. Must be called inside a tokio runtime.
    pub fn start(&self) {
        let core = self.core.clone();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut state_rx = core.store.subscribe();
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !core.store.is_active() {
                            break;
                        }
                        let dispatched = core.tick();
                        debug!("simulation tick dispatched {} actions", dispatched);
                    }
                    changed = state_rx.changed() => {
                        if changed.is_err() || !state_rx.borrow_and_update().is_system_active {
                            break;
                        }
                    }
                }
            }
            debug!("simulation loop exited");
        });

        if let Some(previous) = self.handle.lock().replace(task) {
            previous.abort();
            debug!("replaced running simulation loop");
        }
        info!("Simulation driver started ({:?} interval)", period);
    }

    /// Cancel the loop if running; idempotent
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            info!("Simulation driver stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Run a single tick synchronously; returns the number of actions dispatched
    pub fn tick(&self) -> usize {
        self.core.tick()
    }

    /// One detection-trigger draw against the current snapshot
    pub fn detect_once(&self) -> Option<Action> {
        self.core.detect_once()
    }

    pub fn ticks(&self) -> u64 {
        self.core.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng_from;

    fn driver(store: &Arc<Store>, interval_ms: u64, seed: u64) -> SimulationDriver {
        let config = SimulationConfig {
            interval_ms,
            ..SimulationConfig::default()
        };
        SimulationDriver::new(store.clone(), &config, rng_from(Some(seed)))
    }

    #[test]
    fn test_tick_inactive_does_nothing() {
        let store = Arc::new(Store::new());
        let driver = driver(&store, 2000, 1);
        let before = store.snapshot();
        assert_eq!(driver.tick(), 0);
        assert_eq!(driver.ticks(), 0);
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_tick_drifts_every_active_node() {
        let store = Arc::new(Store::new());
        store.dispatch(Action::StartSystem);
        let driver = driver(&store, 2000, 2);

        for _ in 0..50 {
            let dispatched = driver.tick();
            assert!(dispatched == 4 || dispatched == 5);
        }
        let snapshot = store.snapshot();
        assert_eq!(driver.ticks(), 50);
        assert_eq!(snapshot.total_defects_detected, snapshot.attributed_defect_sum());
        assert!(snapshot.edge_nodes.iter().all(|n| n.processing_time_ms >= 5.0));
        assert!(snapshot.edge_nodes.iter().all(|n| (95.0..=99.9).contains(&n.accuracy)));
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let run = |seed| {
            let store = Arc::new(Store::new());
            store.dispatch(Action::StartSystem);
            let driver = driver(&store, 2000, seed);
            for _ in 0..20 {
                driver.tick();
            }
            let s = store.snapshot();
            (
                s.total_defects_detected,
                s.edge_nodes.iter().map(|n| (n.defects_detected, n.accuracy)).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(77), run(77));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ticks_while_active_and_exits_on_stop() {
        let store = Arc::new(Store::new());
        store.dispatch(Action::StartSystem);
        let driver = driver(&store, 2000, 3);

        driver.start();
        tokio::time::sleep(Duration::from_millis(6500)).await;
        assert_eq!(driver.ticks(), 3);
        assert!(driver.is_running());

        store.dispatch(Action::StopSystem);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!driver.is_running());

        let ticks = driver.ticks();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(driver.ticks(), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_loop() {
        let store = Arc::new(Store::new());
        store.dispatch(Action::StartSystem);
        let driver = driver(&store, 1000, 4);

        driver.start();
        driver.start();
        driver.start();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(driver.ticks(), 3);

        driver.stop();
        driver.stop();
        assert!(!driver.is_running());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(driver.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_loop() {
        let store = Arc::new(Store::new());
        store.dispatch(Action::StartSystem);
        {
            let driver = driver(&store, 1000, 5);
            driver.start();
        }
        let before = store.snapshot();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }
}
