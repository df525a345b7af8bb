// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Aggregate system snapshot

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ComplianceMetric, ComplianceStatus, EdgeNode, InferenceModel, Location, NodeStatus, Trend};
use crate::error::NemiError;

/// Accuracy ceiling shared by nodes and the global model
pub const MAX_ACCURACY: f64 = 99.9;

/// Granularity used to bucket temporal analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalScale {
    Microsecond,
    Second,
    Minute,
    Hour,
    Day,
}

impl TemporalScale {
    pub const ALL: [TemporalScale; 5] = [
        TemporalScale::Microsecond,
        TemporalScale::Second,
        TemporalScale::Minute,
        TemporalScale::Hour,
        TemporalScale::Day,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalScale::Microsecond => "microsecond",
            TemporalScale::Second => "second",
            TemporalScale::Minute => "minute",
            TemporalScale::Hour => "hour",
            TemporalScale::Day => "day",
        }
    }
}

impl fmt::Display for TemporalScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemporalScale {
    type Err = NemiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemporalScale::ALL
            .into_iter()
            .find(|scale| scale.as_str() == s)
            .ok_or_else(|| NemiError::InvalidScale(s.to_string()))
    }
}

/// Complete system state at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NemiState {
    pub is_system_active: bool,
    /// Insertion order is display order
    pub edge_nodes: Vec<EdgeNode>,
    pub global_accuracy: f64,
    pub total_defects_detected: u64,
    /// Defects reported against ids outside `edge_nodes`
    pub unattributed_defects: u64,
    pub average_processing_time: f64,
    pub privacy_score: f64,
    pub federated_learning_rounds: u64,
    pub compliance_metrics: Vec<ComplianceMetric>,
    /// Opaque per-scale payloads owned by the temporal view
    pub temporal_analysis: BTreeMap<TemporalScale, Option<serde_json::Value>>,
    pub ai_model: Option<InferenceModel>,
    pub is_model_loading: bool,
}

impl NemiState {
    /// Seed state: four inactive nodes and three compliance metrics
    pub fn initial(now: DateTime<Utc>) -> Self {
        let edge_nodes = vec![
            EdgeNode::new("node-japan-01", Location::Japan, 8.3, 99.7, now),
            EdgeNode::new("node-japan-02", Location::Japan, 7.9, 99.8, now),
            EdgeNode::new("node-india-01", Location::India, 9.1, 99.5, now),
            EdgeNode::new("node-india-02", Location::India, 8.7, 99.6, now),
        ];

        let compliance_metrics = vec![
            ComplianceMetric::new("safety-compliance", "Safety Compliance", 98.5, ComplianceStatus::Compliant, Trend::Up, now),
            ComplianceMetric::new("quality-control", "Quality Control", 97.2, ComplianceStatus::Compliant, Trend::Stable, now),
            ComplianceMetric::new("environmental", "Environmental", 95.8, ComplianceStatus::Warning, Trend::Down, now),
        ];

        Self {
            is_system_active: false,
            edge_nodes,
            global_accuracy: 99.7,
            total_defects_detected: 0,
            unattributed_defects: 0,
            average_processing_time: 8.5,
            privacy_score: 100.0,
            federated_learning_rounds: 0,
            compliance_metrics,
            temporal_analysis: TemporalScale::ALL.into_iter().map(|s| (s, None)).collect(),
            ai_model: None,
            is_model_loading: false,
        }
    }

    pub fn node(&self, id: &str) -> Option<&EdgeNode> {
        self.edge_nodes.iter().find(|n| n.id == id)
    }

    pub fn metric(&self, id: &str) -> Option<&ComplianceMetric> {
        self.compliance_metrics.iter().find(|m| m.id == id)
    }

    pub fn active_node_count(&self) -> usize {
        self.edge_nodes.iter().filter(|n| n.is_active()).count()
    }

    pub fn active_nodes_in(&self, location: Location) -> usize {
        self.edge_nodes
            .iter()
            .filter(|n| n.location == location && n.status == NodeStatus::Active)
            .count()
    }

    /// Defects attributed to known nodes plus unattributed ones
    pub fn attributed_defect_sum(&self) -> u64 {
        self.edge_nodes.iter().map(|n| n.defects_detected).sum::<u64>() + self.unattributed_defects
    }
}

impl Default for NemiState {
    fn default() -> Self {
        Self::initial(Utc::now())
    }
}
