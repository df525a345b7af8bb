// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Temporal analysis - multi-scale pattern series from microseconds to days

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Engine;
use crate::error::Result;
use crate::model::TemporalScale;
use crate::sim::{self, SimRng, TemporalPoint};
use crate::store::Action;

/// Anomalies above this count flag a scale as `ALERT`
const ALERT_THRESHOLD: usize = 5;

/// Display metadata for a scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleProfile {
    pub scale: TemporalScale,
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub sample_rate: &'static str,
    pub analysis_type: &'static str,
}

impl ScaleProfile {
    pub fn of(scale: TemporalScale) -> Self {
        let (name, unit, description, color, sample_rate, analysis_type) = match scale {
            TemporalScale::Microsecond => (
                "Microsecond",
                "μs",
                "Vibration patterns & micro-movements",
                "#FF10F0",
                "10 kHz",
                "FFT + Pattern Recognition",
            ),
            TemporalScale::Second => (
                "Second",
                "s",
                "Worker actions & equipment cycles",
                "#00E5FF",
                "30 Hz",
                "Action Recognition CNN",
            ),
            TemporalScale::Minute => (
                "Minute",
                "min",
                "Process flows & quality patterns",
                "#39FF14",
                "1 Hz",
                "Time Series Analysis",
            ),
            TemporalScale::Hour => (
                "Hour",
                "hr",
                "Equipment health & maintenance",
                "#FFEAA7",
                "0.1 Hz",
                "Predictive Modeling",
            ),
            TemporalScale::Day => (
                "Day",
                "day",
                "Compliance trends & patterns",
                "#FF6B00",
                "0.01 Hz",
                "Trend Analysis & ML",
            ),
        };
        Self { scale, name, unit, description, color, sample_rate, analysis_type }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScaleStatus {
    Normal,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnomalySeverity {
    Medium,
    High,
}

impl AnomalySeverity {
    fn of(point: &TemporalPoint) -> Self {
        if point.value > 0.8 || point.value < 0.2 {
            AnomalySeverity::High
        } else {
            AnomalySeverity::Medium
        }
    }
}

/// Aggregates over one scale's series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSummary {
    pub scale: TemporalScale,
    pub points: usize,
    pub average: f64,
    pub anomalies: usize,
    pub status: ScaleStatus,
    pub patterns: BTreeMap<String, usize>,
}

impl ScaleSummary {
    pub fn from_points(scale: TemporalScale, points: &[TemporalPoint]) -> Self {
        let anomalies = points.iter().filter(|p| p.anomaly).count();
        let average = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64
        };

        let mut patterns = BTreeMap::new();
        for p in points {
            *patterns.entry(p.pattern.clone()).or_insert(0) += 1;
        }

        Self {
            scale,
            points: points.len(),
            average,
            anomalies,
            status: if anomalies > ALERT_THRESHOLD {
                ScaleStatus::Alert
            } else {
                ScaleStatus::Normal
            },
            patterns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub point: TemporalPoint,
    pub severity: AnomalySeverity,
}

pub struct TemporalAnalysis {
    engine: Arc<Engine>,
    rng: SimRng,
    selected: TemporalScale,
    series: HashMap<TemporalScale, Vec<TemporalPoint>>,
}

impl TemporalAnalysis {
    pub fn new(engine: Arc<Engine>) -> Self {
        let rng = engine.fork_rng();
        let mut view = Self {
            engine,
            rng,
            selected: TemporalScale::Second,
            series: HashMap::new(),
        };
        view.regenerate();
        view
    }

    /// Rebuild every scale's series ending now
    pub fn regenerate(&mut self) {
        let now_ms = Utc::now().timestamp_millis();
        for scale in TemporalScale::ALL {
            let points = sim::temporal_series(scale, &mut self.rng, now_ms);
            self.series.insert(scale, points);
        }
        debug!("Regenerated temporal series, {} anomalies", self.total_anomalies());
    }

    pub fn selected(&self) -> TemporalScale {
        self.selected
    }

    pub fn select(&mut self, scale: TemporalScale) {
        self.selected = scale;
    }

    /// Select by wire name; unknown names are rejected and leave the selection unchanged
    pub fn select_str(&mut self, name: &str) -> Result<TemporalScale> {
        let scale = name.parse()?;
        self.selected = scale;
        Ok(scale)
    }

    pub fn series(&self, scale: TemporalScale) -> &[TemporalPoint] {
        self.series.get(&scale).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn current(&self) -> &[TemporalPoint] {
        self.series(self.selected)
    }

    pub fn summary(&self, scale: TemporalScale) -> ScaleSummary {
        ScaleSummary::from_points(scale, self.series(scale))
    }

    pub fn summaries(&self) -> Vec<ScaleSummary> {
        TemporalScale::ALL.iter().map(|s| self.summary(*s)).collect()
    }

    pub fn total_anomalies(&self) -> usize {
        self.series.values().flatten().filter(|p| p.anomaly).count()
    }

    /// First `limit` anomalies of the selected scale
    pub fn recent_anomalies(&self, limit: usize) -> Vec<AnomalyReport> {
        self.current()
            .iter()
            .filter(|p| p.anomaly)
            .take(limit)
            .map(|p| AnomalyReport { point: p.clone(), severity: AnomalySeverity::of(p) })
            .collect()
    }

    /// Push every scale's summary into the shared store
    pub fn publish(&self) -> Result<()> {
        for summary in self.summaries() {
            let payload = serde_json::to_value(&summary)?;
            self.engine.store().dispatch(Action::UpdateTemporalData { scale: summary.scale, payload });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SimulationConfig};
    use crate::error::NemiError;

    fn engine() -> Arc<Engine> {
        Arc::new(Engine::new(Config {
            simulation: SimulationConfig {
                seed: Some(21),
                ..SimulationConfig::default()
            },
            ..Config::default()
        }))
    }

    fn point(value: f64, pattern: &str, anomaly: bool) -> TemporalPoint {
        TemporalPoint {
            scale: TemporalScale::Minute,
            timestamp: 0,
            value,
            pattern: pattern.to_string(),
            anomaly,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_profiles() {
        let p = ScaleProfile::of(TemporalScale::Microsecond);
        assert_eq!(p.unit, "μs");
        assert_eq!(p.sample_rate, "10 kHz");
        assert_eq!(ScaleProfile::of(TemporalScale::Day).analysis_type, "Trend Analysis & ML");
    }

    #[test]
    fn test_summary_alert_threshold() {
        let mut points: Vec<_> = (0..5).map(|_| point(0.4, "Low Efficiency", true)).collect();
        points.push(point(1.0, "Peak Efficiency", false));

        let summary = ScaleSummary::from_points(TemporalScale::Minute, &points);
        assert_eq!(summary.anomalies, 5);
        assert_eq!(summary.status, ScaleStatus::Normal);
        assert!((summary.average - 0.5).abs() < 1e-9);
        assert_eq!(summary.patterns["Low Efficiency"], 5);

        points.push(point(0.4, "Low Efficiency", true));
        let summary = ScaleSummary::from_points(TemporalScale::Minute, &points);
        assert_eq!(summary.status, ScaleStatus::Alert);

        let empty = ScaleSummary::from_points(TemporalScale::Minute, &[]);
        assert_eq!(empty.average, 0.0);
    }

    #[test]
    fn test_view_selection() {
        let mut view = TemporalAnalysis::new(engine());
        assert_eq!(view.selected(), TemporalScale::Second);
        assert_eq!(view.current().len(), 150);

        view.select(TemporalScale::Hour);
        assert_eq!(view.current().len(), 24);

        assert_eq!(view.select_str("day").unwrap(), TemporalScale::Day);
        assert!(matches!(view.select_str("week"), Err(NemiError::InvalidScale(_))));
        assert_eq!(view.selected(), TemporalScale::Day);
    }

    #[test]
    fn test_recent_anomalies_severity() {
        let mut view = TemporalAnalysis::new(engine());
        view.select(TemporalScale::Microsecond);
        for report in view.recent_anomalies(5) {
            assert!(report.point.anomaly);
            // microsecond anomalies sit outside [0.2, 0.9]
            assert_eq!(report.severity, AnomalySeverity::High);
        }
        assert!(view.recent_anomalies(5).len() <= 5);
    }

    #[test]
    fn test_publish_fills_store() {
        let engine = engine();
        let view = TemporalAnalysis::new(engine.clone());
        view.publish().unwrap();

        let snapshot = engine.snapshot();
        for scale in TemporalScale::ALL {
            let payload = snapshot.temporal_analysis[&scale].as_ref().unwrap();
            let summary: ScaleSummary = serde_json::from_value(payload.clone()).unwrap();
            let expected = view.summary(scale);
            assert_eq!(summary.scale, scale);
            assert_eq!(summary.anomalies, expected.anomalies);
            assert_eq!(summary.patterns, expected.patterns);
            assert!((summary.average - expected.average).abs() < 1e-9);
        }
    }
}
