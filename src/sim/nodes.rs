// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Edge node drift and detection triggers

use rand::seq::SliceRandom;
use rand::Rng;

use super::SimRng;
use crate::config::SimulationConfig;
use crate::model::{NemiState, NodeUpdate};
use crate::store::Action;

/// Random-walk and detection parameters for active nodes
#[derive(Debug, Clone, PartialEq)]
pub struct DriftParams {
    pub detection_threshold: f64,
    pub max_detection_count: u32,
    pub processing_drift_ms: f64,
    pub min_processing_time_ms: f64,
    pub accuracy_drift: f64,
    pub accuracy_floor: f64,
    pub accuracy_ceiling: f64,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for DriftParams {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            detection_threshold: config.detection_threshold,
            max_detection_count: config.max_detection_count.max(1),
            processing_drift_ms: config.processing_drift_ms.abs(),
            min_processing_time_ms: config.min_processing_time_ms,
            accuracy_drift: config.accuracy_drift.abs(),
            accuracy_floor: config.accuracy_floor,
            accuracy_ceiling: config.accuracy_ceiling,
        }
    }
}

/// Pick one node uniformly; an active node fires with probability
/// `1 - detection_threshold`, reporting 1..=max defects.
pub fn detection_trigger(state: &NemiState, params: &DriftParams, rng: &mut SimRng) -> Option<Action> {
    let node = state.edge_nodes.choose(rng)?;

    if node.is_active() && rng.gen::<f64>() > params.detection_threshold {
        let count = rng.gen_range(1..=params.max_detection_count.max(1));
        Some(Action::add_defects(node.id.clone(), count))
    } else {
        None
    }
}

/// One `UpdateNode` per active node, perturbing processing time and accuracy
pub fn drift_updates(state: &NemiState, params: &DriftParams, rng: &mut SimRng) -> Vec<Action> {
    state
        .edge_nodes
        .iter()
        .filter(|node| node.is_active())
        .map(|node| {
            let dt = rng.gen_range(-params.processing_drift_ms..=params.processing_drift_ms);
            let da = rng.gen_range(-params.accuracy_drift..=params.accuracy_drift);

            let processing_time = (node.processing_time_ms + dt).max(params.min_processing_time_ms);
            let accuracy = (node.accuracy + da).max(params.accuracy_floor).min(params.accuracy_ceiling);

            Action::update_node(node.id.clone(), NodeUpdate::metrics(processing_time, accuracy))
        })
        .collect()
}
