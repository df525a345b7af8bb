// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Dashboard - rolling performance timeline and system summary

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Engine;
use crate::model::{Location, NemiState, Trend};
use crate::sim::{self, PerformancePoint, SimRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemMode {
    Operational,
    Standby,
}

impl SystemMode {
    pub fn label(&self) -> &'static str {
        match self {
            SystemMode::Operational => "OPERATIONAL",
            SystemMode::Standby => "STANDBY",
        }
    }
}

/// Per-node row of the edge performance chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePerformance {
    pub name: String,
    pub accuracy: f64,
    pub speed: f64,
    pub defects: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSlice {
    pub name: String,
    pub value: f64,
    pub trend: Trend,
}

/// Everything the dashboard header and metric cards display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub mode: SystemMode,
    pub active_nodes: usize,
    pub total_nodes: usize,
    pub japan_active: usize,
    pub india_active: usize,
    pub global_accuracy: f64,
    pub average_processing_time: f64,
    pub privacy_score: f64,
    pub total_defects: u64,
    pub learning_rounds: u64,
    pub model_ready: bool,
    pub nodes: Vec<NodePerformance>,
    pub compliance: Vec<ComplianceSlice>,
}

impl DashboardSummary {
    pub fn from_state(state: &NemiState) -> Self {
        let mode = if state.is_system_active {
            SystemMode::Operational
        } else {
            SystemMode::Standby
        };

        Self {
            mode,
            active_nodes: state.active_node_count(),
            total_nodes: state.edge_nodes.len(),
            japan_active: state.active_nodes_in(Location::Japan),
            india_active: state.active_nodes_in(Location::India),
            global_accuracy: state.global_accuracy,
            average_processing_time: state.average_processing_time,
            privacy_score: state.privacy_score,
            total_defects: state.total_defects_detected,
            learning_rounds: state.federated_learning_rounds,
            model_ready: state.ai_model.is_some(),
            nodes: state
                .edge_nodes
                .iter()
                .map(|n| NodePerformance {
                    name: display_name(&n.id),
                    accuracy: n.accuracy,
                    speed: n.processing_time_ms,
                    defects: n.defects_detected,
                })
                .collect(),
            compliance: state
                .compliance_metrics
                .iter()
                .map(|m| ComplianceSlice {
                    name: m.name.clone(),
                    value: m.value,
                    trend: m.trend,
                })
                .collect(),
        }
    }

    /// One-line status used by the headless console
    pub fn status_line(&self) -> String {
        format!(
            "{} | nodes {}/{} (JP {} / IN {}) | accuracy {:.1}% | defects {} | rounds {}",
            self.mode.label(),
            self.active_nodes,
            self.total_nodes,
            self.japan_active,
            self.india_active,
            self.global_accuracy,
            self.total_defects,
            self.learning_rounds,
        )
    }
}

/// `node-japan-01` -> `Japan-01`
fn display_name(id: &str) -> String {
    let trimmed = id.strip_prefix("node-").unwrap_or(id);
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct Dashboard {
    engine: Arc<Engine>,
    rng: SimRng,
    timeline: VecDeque<PerformancePoint>,
}

impl Dashboard {
    pub fn new(engine: Arc<Engine>) -> Self {
        let mut rng = engine.fork_rng();
        let window = engine.config.views.performance_window;
        let timeline = sim::performance_window(&mut rng, Utc::now(), window).into();
        Self { engine, rng, timeline }
    }

    /// Roll the timeline by one point; only while the system is active
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if !self.engine.store().is_active() || self.timeline.is_empty() {
            return false;
        }
        self.timeline.pop_front();
        self.timeline.push_back(sim::performance_point(&mut self.rng, now));
        true
    }

    pub fn timeline(&self) -> &VecDeque<PerformancePoint> {
        &self.timeline
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_state(&self.engine.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SimulationConfig};

    fn engine() -> Arc<Engine> {
        Arc::new(Engine::new(Config {
            simulation: SimulationConfig {
                seed: Some(12),
                ..SimulationConfig::default()
            },
            ..Config::default()
        }))
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("node-japan-01"), "Japan-01");
        assert_eq!(display_name("edge-demo-node"), "Edge-demo-node");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_timeline_frozen_while_standby() {
        let engine = engine();
        let mut dashboard = Dashboard::new(engine);
        assert_eq!(dashboard.timeline().len(), 24);

        let before = dashboard.timeline().clone();
        assert!(!dashboard.tick(Utc::now()));
        assert_eq!(dashboard.timeline(), &before);
        assert_eq!(dashboard.summary().mode, SystemMode::Standby);
    }

    #[tokio::test]
    async fn test_timeline_rolls_while_active() {
        let engine = engine();
        let mut dashboard = Dashboard::new(engine.clone());
        engine.start_system();

        let second = dashboard.timeline()[1].clone();
        let now = Utc::now();
        assert!(dashboard.tick(now));
        assert_eq!(dashboard.timeline().len(), 24);
        assert_eq!(dashboard.timeline()[0], second);
        assert_eq!(dashboard.timeline().back().unwrap().time, now);

        let summary = dashboard.summary();
        assert_eq!(summary.mode, SystemMode::Operational);
        assert_eq!(summary.active_nodes, 4);
        assert_eq!((summary.japan_active, summary.india_active), (2, 2));
        assert_eq!(summary.nodes[0].name, "Japan-01");
        assert!(summary.status_line().starts_with("OPERATIONAL | nodes 4/4"));
        engine.stop_system();
    }
}
