// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! NEMI - Simulated Factory Inspection Intelligence Engine
//!
//! A headless engine behind the NEMI inspection dashboard:
//! - Reducer-based state store with change notification
//! - Seeded simulation driver for defect detections and node drift
//! - Federated learning rounds with timed node restoration
//! - View models for edge, temporal, micro-defect and collaboration panels
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        NEMI Engine                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌───────────┐  ┌───────────┐               │
//! │  │ Simulation │→ │  Reducer  │→ │   Store   │→ snapshots    │
//! │  │   Driver   │  │           │  │  (watch)  │               │
//! │  └────────────┘  └───────────┘  └───────────┘               │
//! │        ↑               ↑              ↓                     │
//! │  ┌────────────┐  ┌─────────────────────────────────────┐    │
//! │  │ Scheduler  │  │              Event Bus              │    │
//! │  └────────────┘  └─────────────────────────────────────┘    │
//! │        ↑               ↑              ↓                     │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐  │
//! │  │Dashboard │  │   Edge   │  │Federated │  │ Temporal /  │  │
//! │  │          │  │Processing│  │ Learning │  │ Micro / ... │  │
//! │  └──────────┘  └──────────┘  └──────────┘  └─────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod model;
pub mod sim;
pub mod store;
pub mod views;

// Re-exports for convenience
pub use config::Config;
pub use core::{Engine, EventBus, SystemStatus};
pub use error::{NemiError, Result};
pub use model::{EdgeNode, NemiState, NodeStatus, TemporalScale};
pub use store::{Action, Store};

/// NEMI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NEMI name
pub const NAME: &str = "NEMI";

/// Build info
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION.to_string(),
        target: std::env::consts::ARCH.to_string(),
        os: std::env::consts::OS.to_string(),
    }
}

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version string
    pub version: String,
    /// Target architecture
    pub target: String,
    /// Operating system
    pub os: String,
}
