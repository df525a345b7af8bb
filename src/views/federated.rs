// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Federated learning - network topology and simulated learning rounds

use std::collections::{HashSet, VecDeque};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::Engine;
use crate::model::MAX_ACCURACY;
use crate::sim::SimRng;

use super::BusyGuard;

const CENTER: (f64, f64) = (300.0, 200.0);
const RADIUS: f64 = 120.0;
const COORDINATOR_ID: &str = "coordinator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkRole {
    Coordinator,
    Japan,
    India,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Active,
    Learning,
    Idle,
}

/// A factory (or the coordinator) in the federation graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub role: NetworkRole,
    pub status: ParticipantStatus,
    pub accuracy: f64,
    pub contributions: u32,
    pub last_update: DateTime<Utc>,
}

/// Historical record of one aggregation round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRound {
    pub round: u64,
    pub global_accuracy: f64,
    pub participating_nodes: usize,
    pub convergence_rate: f64,
    /// Remaining differential-privacy budget (epsilon)
    pub privacy_budget: f64,
    pub timestamp: DateTime<Utc>,
}

/// Gradient upload in flight towards the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    pub from: String,
    pub to: String,
    /// Percent, 0..=100
    pub progress: u8,
}

/// Simulated latency of each round phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTimings {
    pub local_training: Duration,
    pub transmission_step: Duration,
    pub aggregation: Duration,
}

impl Default for RoundTimings {
    fn default() -> Self {
        Self {
            local_training: Duration::from_secs(3),
            transmission_step: Duration::from_millis(100),
            aggregation: Duration::from_secs(1),
        }
    }
}

fn initial_network(now: DateTime<Utc>) -> Vec<NetworkNode> {
    let node = |id: &str, x: f64, y: f64, role, status, accuracy, contributions| NetworkNode {
        id: id.to_string(),
        x,
        y,
        role,
        status,
        accuracy,
        contributions,
        last_update: now,
    };
    let (cx, cy) = CENTER;
    let ring = |k: f64| (RADIUS * (k * PI / 3.0).cos(), RADIUS * (k * PI / 3.0).sin());
    let (a0, b0) = ring(0.0);
    let (a1, b1) = ring(1.0);
    let (a2, b2) = ring(2.0);

    use NetworkRole::*;
    use ParticipantStatus::*;
    vec![
        node(COORDINATOR_ID, cx, cy, Coordinator, Active, 99.0, 0),
        node("japan-factory-01", cx - a0, cy - b0, Japan, Active, 99.7, 24),
        node("japan-factory-02", cx - a1, cy - b1, Japan, Active, 99.8, 31),
        node("japan-factory-03", cx - a2, cy - b2, Japan, Idle, 99.4, 18),
        node("india-factory-01", cx + a0, cy + b0, India, Active, 99.5, 28),
        node("india-factory-02", cx + a1, cy + b1, India, Active, 99.6, 22),
        node("india-factory-03", cx + a2, cy + b2, India, Learning, 99.3, 15),
    ]
}

fn synthetic_history(rng: &mut SimRng, len: usize, now: DateTime<Utc>) -> VecDeque<LearningRound> {
    (1..=len as u64)
        .map(|i| LearningRound {
            round: i,
            global_accuracy: 95.0 + i as f64 * 0.2 + rng.gen::<f64>() * 0.1,
            participating_nodes: 4 + rng.gen_range(0..3),
            convergence_rate: 0.8 + rng.gen::<f64>() * 0.2,
            privacy_budget: 1.0 - i as f64 * 0.02,
            timestamp: now - chrono::Duration::hours((len as u64 - i) as i64),
        })
        .collect()
}

/// Federated learning view
pub struct FederatedLearning {
    engine: Arc<Engine>,
    rng: SimRng,
    nodes: Vec<NetworkNode>,
    history: VecDeque<LearningRound>,
    history_len: usize,
    current_round: u64,
    is_learning: AtomicBool,
    transmissions: Vec<Transmission>,
    timings: RoundTimings,
}

impl FederatedLearning {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self::with_timings(engine, RoundTimings::default())
    }

    pub fn with_timings(engine: Arc<Engine>, timings: RoundTimings) -> Self {
        let mut rng = engine.fork_rng();
        let history_len = engine.config.views.learning_history.max(1);
        let now = Utc::now();
        let history = synthetic_history(&mut rng, history_len, now);

        Self {
            engine,
            rng,
            nodes: initial_network(now),
            current_round: history_len as u64,
            history,
            history_len,
            is_learning: AtomicBool::new(false),
            transmissions: Vec::new(),
            timings,
        }
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn history(&self) -> &VecDeque<LearningRound> {
        &self.history
    }

    pub fn transmissions(&self) -> &[Transmission] {
        &self.transmissions
    }

    pub fn current_round(&self) -> u64 {
        self.current_round
    }

    pub fn is_learning(&self) -> bool {
        self.is_learning.load(Ordering::Acquire)
    }

    pub fn privacy_budget(&self) -> f64 {
        self.history.back().map(|r| r.privacy_budget).unwrap_or(1.0)
    }

    /// Active factories, excluding the coordinator
    pub fn active_participants(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.role != NetworkRole::Coordinator && n.status == ParticipantStatus::Active)
            .count()
    }

    /// Run one round: select, train, transmit, aggregate, then advance the
    /// shared store. Returns `None` when a round is already in progress.
    ///
    /// A round dropped before aggregation records nothing and leaves the
    /// store untouched.
    pub async fn run_round(&mut self) -> Option<LearningRound> {
        let _busy = BusyGuard::acquire(&self.is_learning)?;
        let round_started = self.current_round;

        // selection
        let mut participants = HashSet::new();
        for node in self.nodes.iter().filter(|n| n.role != NetworkRole::Coordinator) {
            if self.rng.gen::<f64>() > 0.3 {
                participants.insert(node.id.clone());
            }
        }
        for node in &mut self.nodes {
            node.status = if node.role == NetworkRole::Coordinator {
                ParticipantStatus::Active
            } else if participants.contains(&node.id) {
                ParticipantStatus::Learning
            } else {
                ParticipantStatus::Idle
            };
        }
        debug!("round {}: {} participants", round_started + 1, participants.len());

        // local training
        tokio::time::sleep(self.timings.local_training).await;

        // gradient transmission
        self.transmissions = self
            .nodes
            .iter()
            .filter(|n| participants.contains(&n.id))
            .map(|n| Transmission {
                from: n.id.clone(),
                to: COORDINATOR_ID.to_string(),
                progress: 0,
            })
            .collect();
        for progress in (0..=100u8).step_by(10) {
            for t in &mut self.transmissions {
                t.progress = progress;
            }
            tokio::time::sleep(self.timings.transmission_step).await;
        }

        // aggregation
        tokio::time::sleep(self.timings.aggregation).await;

        let global = self.engine.snapshot().global_accuracy;
        let new_accuracy = (global + 0.05 + self.rng.gen::<f64>() * 0.05).min(MAX_ACCURACY);
        let record = LearningRound {
            round: round_started + 1,
            global_accuracy: new_accuracy,
            participating_nodes: participants.len(),
            convergence_rate: 0.85 + self.rng.gen::<f64>() * 0.1,
            privacy_budget: (1.0 - round_started as f64 * 0.02).max(0.1),
            timestamp: Utc::now(),
        };
        self.history.push_back(record.clone());
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }

        let now = Utc::now();
        for node in &mut self.nodes {
            node.status = ParticipantStatus::Active;
            node.last_update = now;
            if node.role == NetworkRole::Coordinator {
                node.accuracy = new_accuracy;
            } else {
                node.accuracy = (node.accuracy + 0.02 + self.rng.gen::<f64>() * 0.03).min(MAX_ACCURACY);
                if participants.contains(&node.id) {
                    node.contributions += 1;
                }
            }
        }

        self.transmissions.clear();
        self.current_round = record.round;

        self.engine.simulate_federated_learning();
        info!("Federated round {} aggregated from {} factories", record.round, record.participating_nodes);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SimulationConfig};

    fn engine(seed: u64) -> Arc<Engine> {
        Arc::new(Engine::new(Config {
            simulation: SimulationConfig {
                seed: Some(seed),
                ..SimulationConfig::default()
            },
            ..Config::default()
        }))
    }

    #[test]
    fn test_initial_topology() {
        let view = FederatedLearning::new(engine(1));
        assert_eq!(view.nodes().len(), 7);
        assert_eq!(view.nodes()[0].role, NetworkRole::Coordinator);
        assert_eq!((view.nodes()[0].x, view.nodes()[0].y), (300.0, 200.0));
        assert!((view.nodes()[1].x - 180.0).abs() < 1e-9);
        assert!((view.nodes()[4].x - 420.0).abs() < 1e-9);
        for n in &view.nodes()[1..] {
            let d = ((n.x - 300.0).powi(2) + (n.y - 200.0).powi(2)).sqrt();
            assert!((d - RADIUS).abs() < 1e-9);
        }
        assert_eq!(view.active_participants(), 4);
    }

    #[test]
    fn test_synthetic_history() {
        let view = FederatedLearning::new(engine(2));
        assert_eq!(view.history().len(), 20);
        assert_eq!(view.current_round(), 20);
        let first = &view.history()[0];
        assert_eq!(first.round, 1);
        assert!((4..=6).contains(&first.participating_nodes));
        assert!((view.privacy_budget() - 0.6).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_advances_view_and_store() {
        let engine = engine(3);
        engine.start_system();
        engine.driver().stop();
        let mut view = FederatedLearning::new(engine.clone());
        let contributions_before: u32 = view.nodes().iter().map(|n| n.contributions).sum();

        let record = view.run_round().await.unwrap();

        assert_eq!(record.round, 21);
        assert_eq!(view.current_round(), 21);
        assert_eq!(view.history().len(), 20);
        assert_eq!(view.history().back(), Some(&record));
        assert!((record.privacy_budget - 0.6).abs() < 1e-9);
        assert!(record.global_accuracy <= MAX_ACCURACY);
        assert!(!view.is_learning());
        assert!(view.transmissions().is_empty());
        assert!(view.nodes().iter().all(|n| n.status == ParticipantStatus::Active));

        let contributions_after: u32 = view.nodes().iter().map(|n| n.contributions).sum();
        assert_eq!(contributions_after - contributions_before, record.participating_nodes as u32);
        assert_eq!(view.nodes()[0].accuracy, record.global_accuracy);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.federated_learning_rounds, 1);
        assert!((snapshot.global_accuracy - 99.8).abs() < 1e-9);
        engine.stop_system();
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_takes_simulated_phases() {
        let engine = engine(4);
        let mut view = FederatedLearning::new(engine);
        let started = tokio::time::Instant::now();
        view.run_round().await.unwrap();
        // 3s training + 11 x 100ms transmission + 1s aggregation
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(5100));
        assert!(elapsed < Duration::from_millis(5200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_round_can_be_rerun() {
        let engine = engine(6);
        let mut view = FederatedLearning::new(engine.clone());

        let cancelled = tokio::time::timeout(Duration::from_secs(1), view.run_round()).await;
        assert!(cancelled.is_err());
        assert!(!view.is_learning());
        assert_eq!(view.current_round(), 20);
        assert_eq!(engine.snapshot().federated_learning_rounds, 0);

        let record = view.run_round().await.unwrap();
        assert_eq!(record.round, 21);
        assert!(view.transmissions().is_empty());
        assert_eq!(engine.snapshot().federated_learning_rounds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_privacy_budget_floor() {
        let engine = engine(5);
        let mut view = FederatedLearning::with_timings(
            engine,
            RoundTimings {
                local_training: Duration::ZERO,
                transmission_step: Duration::ZERO,
                aggregation: Duration::ZERO,
            },
        );
        let mut last = None;
        for _ in 0..40 {
            last = view.run_round().await;
        }
        assert_eq!(last.unwrap().privacy_budget, 0.1);
        assert_eq!(view.current_round(), 60);
    }
}
