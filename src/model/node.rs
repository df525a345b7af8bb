// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Edge nodes and compliance metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::MAX_ACCURACY;

/// Operating status of an edge node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Active,
    Inactive,
    Learning,
}

/// Display grouping of an edge node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Japan,
    India,
    Global,
}

impl Location {
    pub fn label(&self) -> &'static str {
        match self {
            Location::Japan => "Japan",
            Location::India => "India",
            Location::Global => "Global",
        }
    }
}

/// A simulated factory inspection station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeNode {
    pub id: String,
    pub status: NodeStatus,
    pub location: Location,
    /// Milliseconds per inspected frame
    pub processing_time_ms: f64,
    /// Percentage in [0, 100]
    pub accuracy: f64,
    pub defects_detected: u64,
    pub last_update: DateTime<Utc>,
}

impl EdgeNode {
    pub fn new(id: &str, location: Location, processing_time_ms: f64, accuracy: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            status: NodeStatus::Inactive,
            location,
            processing_time_ms,
            accuracy,
            defects_detected: 0,
            last_update: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }
}

/// Partial edge-node update; `None` fields are left untouched.
///
/// The defect counter is not updatable here; it only grows through
/// `AddDefectDetection`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub status: Option<NodeStatus>,
    pub location: Option<Location>,
    pub processing_time_ms: Option<f64>,
    pub accuracy: Option<f64>,
}

impl NodeUpdate {
    pub fn status(status: NodeStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn metrics(processing_time_ms: f64, accuracy: f64) -> Self {
        Self {
            processing_time_ms: Some(processing_time_ms),
            accuracy: Some(accuracy),
            ..Default::default()
        }
    }

    /// Apply the supplied fields onto `node`
    pub fn apply_to(&self, node: &mut EdgeNode) {
        if let Some(status) = self.status {
            node.status = status;
        }
        if let Some(location) = self.location {
            node.location = location;
        }
        // non-finite or non-positive timings are dropped
        if let Some(pt) = self.processing_time_ms.filter(|pt| pt.is_finite() && *pt > 0.0) {
            node.processing_time_ms = pt;
        }
        if let Some(acc) = self.accuracy.filter(|acc| acc.is_finite()) {
            node.accuracy = acc.clamp(0.0, MAX_ACCURACY);
        }
    }
}

/// Regulatory standing of a compliance metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Compliant,
    Warning,
    Violation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// A named regulatory score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceMetric {
    pub id: String,
    pub name: String,
    pub value: f64,
    /// Caller-supplied, never derived from `value`
    pub status: ComplianceStatus,
    pub trend: Trend,
    pub timestamp: DateTime<Utc>,
}

impl ComplianceMetric {
    pub fn new(id: &str, name: &str, value: f64, status: ComplianceStatus, trend: Trend, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            value,
            status,
            trend,
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_touches_only_supplied_fields() {
        let now = Utc::now();
        let mut node = EdgeNode::new("n1", Location::Japan, 8.0, 99.0, now);

        NodeUpdate::status(NodeStatus::Learning).apply_to(&mut node);
        assert_eq!(node.status, NodeStatus::Learning);
        assert_eq!(node.processing_time_ms, 8.0);
        assert_eq!(node.accuracy, 99.0);

        NodeUpdate::metrics(6.5, 97.0).apply_to(&mut node);
        assert_eq!(node.status, NodeStatus::Learning);
        assert_eq!(node.processing_time_ms, 6.5);
        assert_eq!(node.accuracy, 97.0);
        assert_eq!(node.location, Location::Japan);
    }

    #[test]
    fn test_accuracy_clamped_and_nan_ignored() {
        let mut node = EdgeNode::new("n1", Location::India, 8.0, 99.0, Utc::now());

        NodeUpdate { accuracy: Some(150.0), ..Default::default() }.apply_to(&mut node);
        assert_eq!(node.accuracy, MAX_ACCURACY);

        NodeUpdate { accuracy: Some(-4.0), ..Default::default() }.apply_to(&mut node);
        assert_eq!(node.accuracy, 0.0);

        NodeUpdate { accuracy: Some(f64::NAN), ..Default::default() }.apply_to(&mut node);
        assert_eq!(node.accuracy, 0.0);

        NodeUpdate { accuracy: Some(f64::INFINITY), ..Default::default() }.apply_to(&mut node);
        assert_eq!(node.accuracy, 0.0);
    }

    #[test]
    fn test_invalid_processing_time_ignored() {
        let mut node = EdgeNode::new("n1", Location::India, 8.0, 99.0, Utc::now());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            NodeUpdate { processing_time_ms: Some(bad), ..Default::default() }.apply_to(&mut node);
            assert_eq!(node.processing_time_ms, 8.0);
        }
        NodeUpdate { processing_time_ms: Some(0.5), ..Default::default() }.apply_to(&mut node);
        assert_eq!(node.processing_time_ms, 0.5);
    }

    #[test]
    fn test_update_payload_cannot_reset_defects() {
        let mut node = EdgeNode::new("n1", Location::Japan, 8.0, 99.0, Utc::now());
        node.defects_detected = 5;

        let update: NodeUpdate = serde_json::from_str(r#"{"defects_detected": 0, "accuracy": 98.0}"#).unwrap();
        update.apply_to(&mut node);
        assert_eq!(node.defects_detected, 5);
        assert_eq!(node.accuracy, 98.0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&NodeStatus::Learning).unwrap();
        assert_eq!(json, "\"learning\"");
    }
}
