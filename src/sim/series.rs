// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Time series generators

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use crate::model::TemporalScale;

/// One point of the dashboard performance timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub time: DateTime<Utc>,
    pub accuracy: f64,
    pub processing_time: f64,
    pub defects: u32,
}

impl PerformancePoint {
    /// `HH:MM` axis label
    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

pub fn performance_point(rng: &mut SimRng, time: DateTime<Utc>) -> PerformancePoint {
    PerformancePoint {
        time,
        accuracy: 97.0 + rng.gen::<f64>() * 2.5,
        processing_time: 6.0 + rng.gen::<f64>() * 6.0,
        defects: rng.gen_range(0..5),
    }
}

/// `len` points one minute apart, the last stamped `now`
pub fn performance_window(rng: &mut SimRng, now: DateTime<Utc>, len: usize) -> Vec<PerformancePoint> {
    (0..len)
        .rev()
        .map(|i| performance_point(rng, now - Duration::minutes(i as i64)))
        .collect()
}

/// One sample of a temporal-analysis series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPoint {
    pub scale: TemporalScale,
    /// Unix milliseconds
    pub timestamp: i64,
    pub value: f64,
    pub pattern: String,
    pub anomaly: bool,
    pub confidence: f64,
}

/// Window length (ms) and sample count per scale
fn window(scale: TemporalScale) -> (f64, usize) {
    match scale {
        TemporalScale::Microsecond => (1_000.0, 100),
        TemporalScale::Second => (300_000.0, 150),
        TemporalScale::Minute => (7_200_000.0, 120),
        TemporalScale::Hour => (86_400_000.0, 24),
        TemporalScale::Day => (2_592_000_000.0, 30),
    }
}

/// Generate the series for `scale` ending at `now_ms`
pub fn temporal_series(scale: TemporalScale, rng: &mut SimRng, now_ms: i64) -> Vec<TemporalPoint> {
    let (range, points) = window(scale);

    (0..points)
        .map(|i| {
            let x = i as f64;
            let timestamp = now_ms - (range * (points - i) as f64 / points as f64) as i64;

            let (value, pattern, anomaly) = match scale {
                TemporalScale::Microsecond => {
                    let v = 0.5 + 0.3 * (x * 0.1).sin() + 0.1 * rng.gen::<f64>();
                    let p = band(v, 0.8, 0.3, "High Vibration", "Low Vibration", "Normal");
                    (v, p, v > 0.9 || v < 0.2)
                }
                TemporalScale::Second => {
                    let v = 0.6 + 0.2 * (x * 0.05).sin() + 0.15 * rng.gen::<f64>();
                    let p = band(v, 0.8, 0.4, "High Activity", "Idle Period", "Normal Activity");
                    (v, p, rng.gen::<f64>() > 0.95)
                }
                TemporalScale::Minute => {
                    let v = 0.7 + 0.1 * (x * 0.02).cos() + 0.1 * rng.gen::<f64>();
                    let p = band(v, 0.85, 0.6, "Peak Efficiency", "Low Efficiency", "Normal Flow");
                    (v, p, v < 0.5)
                }
                TemporalScale::Hour => {
                    // slow degradation
                    let v = 0.8 - x * 0.001 + 0.05 * rng.gen::<f64>();
                    let p = band(v, 0.9, 0.7, "Excellent Health", "Maintenance Needed", "Good Health");
                    (v, p, v < 0.6)
                }
                TemporalScale::Day => {
                    let v = 0.85 + 0.1 * (x * 0.01).sin() + 0.05 * rng.gen::<f64>();
                    let p = band(v, 0.95, 0.8, "High Compliance", "Compliance Risk", "Good Compliance");
                    (v, p, v < 0.75)
                }
            };

            TemporalPoint {
                scale,
                timestamp,
                value,
                pattern: pattern.to_string(),
                anomaly,
                confidence: 0.8 + rng.gen::<f64>() * 0.2,
            }
        })
        .collect()
}

fn band(value: f64, high: f64, low: f64, above: &'static str, below: &'static str, normal: &'static str) -> &'static str {
    if value > high {
        above
    } else if value < low {
        below
    } else {
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng_from;

    #[test]
    fn test_performance_window_spacing() {
        let now = Utc::now();
        let window = performance_window(&mut rng_from(Some(1)), now, 24);
        assert_eq!(window.len(), 24);
        assert_eq!(window.last().unwrap().time, now);
        assert_eq!(window[0].time, now - Duration::minutes(23));
        for p in &window {
            assert!((97.0..=99.5).contains(&p.accuracy));
            assert!((6.0..=12.0).contains(&p.processing_time));
            assert!(p.defects < 5);
        }
    }

    #[test]
    fn test_series_lengths_and_order() {
        let now_ms = 1_700_000_000_000;
        let mut rng = rng_from(Some(3));
        for (scale, expected) in [
            (TemporalScale::Microsecond, 100),
            (TemporalScale::Second, 150),
            (TemporalScale::Minute, 120),
            (TemporalScale::Hour, 24),
            (TemporalScale::Day, 30),
        ] {
            let series = temporal_series(scale, &mut rng, now_ms);
            assert_eq!(series.len(), expected);
            assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            assert!(series.iter().all(|p| p.timestamp < now_ms && p.scale == scale));
        }
    }

    #[test]
    fn test_minute_series_never_anomalous() {
        // 0.7 + 0.1cos - never drops below 0.6
        let series = temporal_series(TemporalScale::Minute, &mut rng_from(Some(8)), 0);
        assert!(series.iter().all(|p| !p.anomaly));
        assert!(series.iter().all(|p| p.pattern != "Low Efficiency"));
    }

    #[test]
    fn test_microsecond_patterns_follow_value() {
        let series = temporal_series(TemporalScale::Microsecond, &mut rng_from(Some(4)), 0);
        for p in &series {
            match p.pattern.as_str() {
                "High Vibration" => assert!(p.value > 0.8),
                "Low Vibration" => assert!(p.value < 0.3),
                "Normal" => assert!((0.3..=0.8).contains(&p.value)),
                other => panic!("unexpected pattern {}", other),
            }
            assert_eq!(p.anomaly, p.value > 0.9 || p.value < 0.2);
        }
    }
}
