//! Core engine module - orchestrates the store, driver and timers

mod driver;
mod engine;
mod event_bus;
mod scheduler;

pub use driver::SimulationDriver;
pub use engine::Engine;
pub use event_bus::{AlertLevel, Event, EventBus, EventKind, EventPayload, Subscription};
pub use scheduler::Scheduler;

use serde::{Deserialize, Serialize};

/// System-wide status summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub running: bool,
    pub nodes_active: usize,
    pub nodes_total: usize,
    pub total_detections: u64,
    pub learning_rounds: u64,
    pub global_accuracy: f64,
    pub uptime_seconds: u64,
    pub driver_ticks: u64,
    pub pending_timers: usize,
}
