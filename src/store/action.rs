// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Closed set of state transitions

use serde::{Deserialize, Serialize};

use crate::model::{ComplianceMetric, InferenceModel, NodeUpdate, TemporalScale};

/// Every way the system snapshot can change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StartSystem,
    StopSystem,
    UpdateNode {
        node_id: String,
        updates: NodeUpdate,
    },
    AddDefectDetection {
        node_id: String,
        count: u32,
    },
    UpdateComplianceMetric(ComplianceMetric),
    SetModel(InferenceModel),
    SetModelLoading(bool),
    FederatedLearningRound,
    UpdateTemporalData {
        scale: TemporalScale,
        payload: serde_json::Value,
    },
}

impl Action {
    pub fn update_node(node_id: impl Into<String>, updates: NodeUpdate) -> Self {
        Action::UpdateNode {
            node_id: node_id.into(),
            updates,
        }
    }

    pub fn add_defects(node_id: impl Into<String>, count: u32) -> Self {
        Action::AddDefectDetection {
            node_id: node_id.into(),
            count,
        }
    }

    /// Short name used in logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            Action::StartSystem => "START_SYSTEM",
            Action::StopSystem => "STOP_SYSTEM",
            Action::UpdateNode { .. } => "UPDATE_NODE",
            Action::AddDefectDetection { .. } => "ADD_DEFECT_DETECTION",
            Action::UpdateComplianceMetric(_) => "UPDATE_COMPLIANCE_METRIC",
            Action::SetModel(_) => "SET_MODEL",
            Action::SetModelLoading(_) => "SET_MODEL_LOADING",
            Action::FederatedLearningRound => "FEDERATED_LEARNING_ROUND",
            Action::UpdateTemporalData { .. } => "UPDATE_TEMPORAL_DATA",
        }
    }
}
