// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Pure state transition function

use chrono::{DateTime, Utc};
use tracing::debug;

use super::Action;
use crate::model::{NemiState, NodeStatus, MAX_ACCURACY};

/// Accuracy gained per federated learning round
pub const LEARNING_ROUND_GAIN: f64 = 0.1;

/// Apply `action` to `state`, returning the next snapshot.
///
/// Total over every input: unknown node or metric ids leave the matching
/// collection untouched instead of failing.
pub fn reduce(state: &NemiState, action: &Action, now: DateTime<Utc>) -> NemiState {
    let mut next = state.clone();

    match action {
        Action::StartSystem => {
            next.is_system_active = true;
            for node in &mut next.edge_nodes {
                node.status = NodeStatus::Active;
                node.last_update = now;
            }
        }

        Action::StopSystem => {
            next.is_system_active = false;
            for node in &mut next.edge_nodes {
                node.status = NodeStatus::Inactive;
            }
        }

        Action::UpdateNode { node_id, updates } => {
            match next.edge_nodes.iter_mut().find(|n| &n.id == node_id) {
                Some(node) => {
                    updates.apply_to(node);
                    node.last_update = now;
                }
                None => debug!("UPDATE_NODE ignored, unknown node '{}'", node_id),
            }
        }

        Action::AddDefectDetection { node_id, count } => {
            let count = u64::from(*count);
            next.total_defects_detected += count;
            match next.edge_nodes.iter_mut().find(|n| &n.id == node_id) {
                Some(node) => node.defects_detected += count,
                None => {
                    debug!("ADD_DEFECT_DETECTION for unknown node '{}' counted as unattributed", node_id);
                    next.unattributed_defects += count;
                }
            }
        }

        Action::UpdateComplianceMetric(metric) => {
            match next.compliance_metrics.iter_mut().find(|m| m.id == metric.id) {
                Some(slot) => *slot = metric.clone(),
                None => debug!("UPDATE_COMPLIANCE_METRIC ignored, unknown metric '{}'", metric.id),
            }
        }

        Action::SetModel(model) => {
            next.ai_model = Some(model.clone());
            next.is_model_loading = false;
        }

        Action::SetModelLoading(loading) => {
            next.is_model_loading = *loading;
        }

        Action::FederatedLearningRound => {
            next.federated_learning_rounds += 1;
            next.global_accuracy = (next.global_accuracy + LEARNING_ROUND_GAIN).min(MAX_ACCURACY);
        }

        Action::UpdateTemporalData { scale, payload } => {
            next.temporal_analysis.insert(*scale, Some(payload.clone()));
        }
    }

    next
}
