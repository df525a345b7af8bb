// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Main NEMI engine - owns the store and every timer that feeds it

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{error, info};

use super::{EventBus, Scheduler, SimulationDriver, SystemStatus};
use crate::config::Config;
use crate::error::Result;
use crate::model::{InferenceModel, NemiState, NodeStatus, NodeUpdate};
use crate::sim::{self, SimRng};
use crate::store::{Action, Store};

/// Main NEMI engine
pub struct Engine {
    pub config: Arc<Config>,
    store: Arc<Store>,
    event_bus: Arc<EventBus>,
    driver: SimulationDriver,
    scheduler: Scheduler,
    rng: Mutex<SimRng>,
    start_time: Mutex<Option<Instant>>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let event_bus = Arc::new(EventBus::new(config.event_bus_capacity));
        let store = Arc::new(Store::new().with_event_bus(event_bus.clone()));

        let mut root = sim::rng_from(config.simulation.seed);
        let driver = SimulationDriver::new(store.clone(), &config.simulation, sim::fork(&mut root));

        Self {
            config,
            store,
            event_bus,
            driver,
            scheduler: Scheduler::new(),
            rng: Mutex::new(root),
            start_time: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn driver(&self) -> &SimulationDriver {
        &self.driver
    }

    pub fn snapshot(&self) -> Arc<NemiState> {
        self.store.snapshot()
    }

    /// Independent generator for a view; deterministic under a configured seed
    pub fn fork_rng(&self) -> SimRng {
        sim::fork(&mut self.rng.lock())
    }

    /// Activate every node and (re)start the simulation loop
    pub fn start_system(&self) {
        info!("Starting NEMI system...");
        self.store.dispatch(Action::StartSystem);
        self.driver.start();
        *self.start_time.lock() = Some(Instant::now());
        info!("NEMI system operational");
    }

    /// Deactivate every node and release all timers
    pub fn stop_system(&self) {
        info!("Stopping NEMI system...");
        self.store.dispatch(Action::StopSystem);
        self.driver.stop();
        self.scheduler.cancel_all();
        *self.start_time.lock() = None;
        info!("NEMI system on standby");
    }

    pub fn simulate_defect_detection(&self) -> Option<Action> {
        self.driver.detect_once()
    }

    /// Advance one learning round and put active nodes into `Learning` until
    /// the restore delay elapses. Must be called inside a tokio runtime.
    pub fn simulate_federated_learning(&self) {
        self.store.dispatch(Action::FederatedLearningRound);

        let snapshot = self.store.snapshot();
        let delay = self.config.simulation.learning_restore();

        for node in snapshot.edge_nodes.iter().filter(|n| n.is_active()) {
            self.store
                .dispatch(Action::update_node(node.id.clone(), NodeUpdate::status(NodeStatus::Learning)));

            let store = self.store.clone();
            let node_id = node.id.clone();
            self.scheduler.schedule_once(&format!("learning-restore:{}", node.id), delay, move || {
                // a stop in the meantime must not be undone
                let still_learning = store
                    .snapshot()
                    .node(&node_id)
                    .map(|n| n.status == NodeStatus::Learning)
                    .unwrap_or(false);
                if still_learning {
                    store.dispatch(Action::update_node(node_id, NodeUpdate::status(NodeStatus::Active)));
                }
            });
        }

        info!(
            "Federated learning round {} complete, global accuracy {:.1}%",
            snapshot.federated_learning_rounds, snapshot.global_accuracy
        );
    }

    /// Build the placeholder defect classifier
    pub async fn init_model(&self) -> Result<()> {
        self.init_model_with(InferenceModel::defect_classifier).await
    }

    /// Model lifecycle around `build`; a failure leaves the store "not loading"
    pub async fn init_model_with<F>(&self, build: F) -> Result<()>
    where
        F: FnOnce() -> Result<InferenceModel>,
    {
        self.store.dispatch(Action::SetModelLoading(true));

        match build() {
            Ok(model) => {
                info!("Initialized model '{}' ({} parameters)", model.name, model.parameter_count);
                self.store.dispatch(Action::SetModel(model));
                Ok(())
            }
            Err(e) => {
                error!("Failed to initialize AI model: {}", e);
                self.store.dispatch(Action::SetModelLoading(false));
                self.event_bus.publish_error(1, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn uptime(&self) -> u64 {
        self.start_time.lock().map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }

    pub fn status(&self) -> SystemStatus {
        let snapshot = self.store.snapshot();
        SystemStatus {
            running: snapshot.is_system_active,
            nodes_active: snapshot.active_node_count(),
            nodes_total: snapshot.edge_nodes.len(),
            total_detections: snapshot.total_defects_detected,
            learning_rounds: snapshot.federated_learning_rounds,
            global_accuracy: snapshot.global_accuracy,
            uptime_seconds: self.uptime(),
            driver_ticks: self.driver.ticks(),
            pending_timers: self.scheduler.pending_count(),
        }
    }
}
