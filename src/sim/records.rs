// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Ephemeral detection records for the edge and micro-defect views

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SimRng;

/// Chance that a processed frame yields a detection
const FRAME_DETECTION_PROBABILITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionKind {
    Defect,
    Compliance,
    Anomaly,
}

/// Bounding-box detection overlaid on a camera frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDetection {
    pub id: String,
    pub kind: DetectionKind,
    pub confidence: f64,
    /// x, y, width, height in frame pixels
    pub bbox: [f64; 4],
    pub timestamp: DateTime<Utc>,
}

impl EdgeDetection {
    pub fn label(&self) -> String {
        let kind = match self.kind {
            DetectionKind::Defect => "DEFECT",
            DetectionKind::Compliance => "COMPLIANCE",
            DetectionKind::Anomaly => "ANOMALY",
        };
        format!("{} {:.1}%", kind, self.confidence * 100.0)
    }
}

/// Simulate one frame of inference over a `width` x `height` frame
pub fn frame_detection(rng: &mut SimRng, width: f64, height: f64, now: DateTime<Utc>) -> Option<EdgeDetection> {
    if rng.gen::<f64>() <= 1.0 - FRAME_DETECTION_PROBABILITY {
        return None;
    }

    let kind = if rng.gen::<f64>() > 0.7 {
        DetectionKind::Defect
    } else if rng.gen::<f64>() > 0.5 {
        DetectionKind::Compliance
    } else {
        DetectionKind::Anomaly
    };

    let bbox = [
        rng.gen::<f64>() * (width - 100.0).max(0.0),
        rng.gen::<f64>() * (height - 100.0).max(0.0),
        50.0 + rng.gen::<f64>() * 100.0,
        50.0 + rng.gen::<f64>() * 100.0,
    ];

    Some(EdgeDetection {
        id: format!("det_{}", Uuid::new_v4().simple()),
        kind,
        confidence: 0.7 + rng.gen::<f64>() * 0.3,
        bbox,
        timestamp: now,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefectKind {
    Scratch,
    Pit,
    Crack,
    Contamination,
    Discoloration,
}

impl DefectKind {
    pub const ALL: [DefectKind; 5] = [
        DefectKind::Scratch,
        DefectKind::Pit,
        DefectKind::Crack,
        DefectKind::Contamination,
        DefectKind::Discoloration,
    ];

    fn describe(&self, size: f64) -> String {
        match self {
            DefectKind::Scratch => format!("Linear surface damage {:.2}μm deep", size),
            DefectKind::Pit => format!("Circular depression {:.2}μm diameter", size),
            DefectKind::Crack => format!("Surface fracture {:.2}μm width", size),
            DefectKind::Contamination => format!("Foreign particle {:.2}μm size", size),
            DefectKind::Discoloration => format!("Color variation {:.2}μm area", size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Sub-millimetre surface defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroDefect {
    pub id: String,
    pub kind: DefectKind,
    /// Surface coordinates; y is height above the plate
    pub position: [f64; 3],
    /// Micrometres
    pub size: f64,
    pub severity: Severity,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// Generate `count` defects scattered over a 8x8 surface
pub fn micro_defects(rng: &mut SimRng, count: usize, now: DateTime<Utc>) -> Vec<MicroDefect> {
    (0..count)
        .map(|i| {
            let kind = *DefectKind::ALL.choose(rng).unwrap_or(&DefectKind::Scratch);
            let position = [
                (rng.gen::<f64>() - 0.5) * 8.0,
                0.15 + rng.gen::<f64>() * 0.1,
                (rng.gen::<f64>() - 0.5) * 8.0,
            ];
            let size = 0.5 + rng.gen::<f64>() * 4.5;
            let severity = if rng.gen::<f64>() > 0.7 {
                Severity::High
            } else if rng.gen::<f64>() > 0.4 {
                Severity::Medium
            } else {
                Severity::Low
            };

            MicroDefect {
                id: format!("defect_{}_{}", now.timestamp_millis(), i),
                kind,
                position,
                size,
                severity,
                confidence: 0.8 + rng.gen::<f64>() * 0.2,
                timestamp: now,
                description: kind.describe(size),
            }
        })
        .collect()
}
