// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Micro-defect detection - progressive surface scan

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::Engine;
use crate::sim::{self, MicroDefect, Severity, SimRng};

use super::BusyGuard;

pub const DEFAULT_MAGNIFICATION: u32 = 1000;
pub const DEFAULT_SENSITIVITY: f64 = 0.5;
const MAGNIFICATION_RANGE: (u32, u32) = (100, 10_000);
const PROGRESS_STEP: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub defects_found: usize,
    /// Micrometres; zero when nothing is visible
    pub average_size: f64,
    pub by_severity: BTreeMap<Severity, usize>,
}

pub struct MicroDefectDetection {
    rng: SimRng,
    defects_per_scan: usize,
    scan_step: Duration,
    revealed: Vec<MicroDefect>,
    progress: u8,
    scanning: AtomicBool,
    magnification: u32,
    sensitivity: f64,
    selected: Option<String>,
}

impl MicroDefectDetection {
    pub fn new(engine: &Engine) -> Self {
        let views = &engine.config.views;
        Self {
            rng: engine.fork_rng(),
            defects_per_scan: views.micro_defects_per_scan,
            scan_step: Duration::from_millis(views.scan_step_ms),
            revealed: Vec::new(),
            progress: 0,
            scanning: AtomicBool::new(false),
            magnification: DEFAULT_MAGNIFICATION,
            sensitivity: DEFAULT_SENSITIVITY,
            selected: None,
        }
    }

    pub async fn start_scan(&mut self) -> ScanSummary {
        self.start_scan_with(|_, _| {}).await
    }

    /// Run a scan, calling `observe(progress, revealed)` at every step.
    /// Returns immediately with the current summary if a scan is running.
    pub async fn start_scan_with<F>(&mut self, mut observe: F) -> ScanSummary
    where
        F: FnMut(u8, &[MicroDefect]),
    {
        let Some(_busy) = BusyGuard::acquire(&self.scanning) else {
            return self.summary();
        };
        self.progress = 0;
        self.revealed.clear();
        self.selected = None;

        let total = sim::micro_defects(&mut self.rng, self.defects_per_scan, Utc::now());
        info!("Micro scan started at {}x", self.magnification);

        for progress in (0..=100usize).step_by(PROGRESS_STEP) {
            let reveal = progress * total.len() / 100;
            self.progress = progress as u8;
            self.revealed = total[..reveal].to_vec();
            observe(self.progress, &self.revealed);
            if progress % 20 == 0 {
                debug!("scan {}%: {} defects", progress, reveal);
            }
            tokio::time::sleep(self.scan_step).await;
        }

        let summary = self.summary();
        info!(
            "Micro scan complete: {} defects, avg {:.2}μm",
            summary.defects_found, summary.average_size
        );
        summary
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn magnification(&self) -> u32 {
        self.magnification
    }

    pub fn set_magnification(&mut self, value: u32) {
        self.magnification = value.clamp(MAGNIFICATION_RANGE.0, MAGNIFICATION_RANGE.1);
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, value: f64) {
        self.sensitivity = if value.is_nan() { DEFAULT_SENSITIVITY } else { value.clamp(0.0, 1.0) };
    }

    /// Revealed defects passing the sensitivity filter
    pub fn visible(&self) -> Vec<&MicroDefect> {
        self.revealed.iter().filter(|d| d.confidence >= self.sensitivity).collect()
    }

    /// Select a visible defect by id; returns false if it is not visible
    pub fn select(&mut self, id: &str) -> bool {
        let found = self.visible().iter().any(|d| d.id == id);
        self.selected = found.then(|| id.to_string());
        found
    }

    pub fn selected(&self) -> Option<&MicroDefect> {
        let id = self.selected.as_deref()?;
        self.revealed.iter().find(|d| d.id == id)
    }

    pub fn summary(&self) -> ScanSummary {
        let visible = self.visible();
        let mut by_severity = BTreeMap::new();
        for d in &visible {
            *by_severity.entry(d.severity).or_insert(0) += 1;
        }

        ScanSummary {
            defects_found: visible.len(),
            average_size: if visible.is_empty() {
                0.0
            } else {
                visible.iter().map(|d| d.size).sum::<f64>() / visible.len() as f64
            },
            by_severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SimulationConfig};

    fn engine() -> Engine {
        Engine::new(Config {
            simulation: SimulationConfig {
                seed: Some(33),
                ..SimulationConfig::default()
            },
            ..Config::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_reveals_progressively() {
        let engine = engine();
        let mut view = MicroDefectDetection::new(&engine);

        let mut steps = Vec::new();
        let summary = view
            .start_scan_with(|progress, revealed| steps.push((progress, revealed.len())))
            .await;

        assert_eq!(steps.len(), 51);
        assert_eq!(steps[0], (0, 0));
        assert_eq!(steps[25], (50, 4));
        assert_eq!(steps[50], (100, 8));
        assert!(steps.windows(2).all(|w| w[0].1 <= w[1].1));

        assert!(!view.is_scanning());
        assert_eq!(view.progress(), 100);
        // confidences are >= 0.8, above the default sensitivity
        assert_eq!(summary.defects_found, 8);
        assert!((0.5..=5.0).contains(&summary.average_size));
        assert_eq!(summary.by_severity.values().sum::<usize>(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sensitivity_filters_visible() {
        let engine = engine();
        let mut view = MicroDefectDetection::new(&engine);
        view.start_scan().await;

        view.set_sensitivity(1.0);
        assert!(view.visible().is_empty());
        assert_eq!(view.summary().average_size, 0.0);

        view.set_sensitivity(-3.0);
        assert_eq!(view.sensitivity(), 0.0);
        assert_eq!(view.visible().len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_and_rescan() {
        let engine = engine();
        let mut view = MicroDefectDetection::new(&engine);
        view.start_scan().await;

        let id = view.visible()[0].id.clone();
        assert!(view.select(&id));
        assert_eq!(view.selected().map(|d| d.id.as_str()), Some(id.as_str()));
        assert!(!view.select("missing"));
        assert!(view.selected().is_none());

        view.select(&id);
        view.start_scan().await;
        assert!(view.selected().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_scan_can_be_restarted() {
        let engine = engine();
        let mut view = MicroDefectDetection::new(&engine);

        let cancelled = tokio::time::timeout(Duration::from_millis(500), view.start_scan()).await;
        assert!(cancelled.is_err());
        assert!(!view.is_scanning());
        assert!(view.progress() < 100);

        let summary = view.start_scan().await;
        assert_eq!(view.progress(), 100);
        assert_eq!(summary.defects_found, 8);
    }

    #[test]
    fn test_magnification_clamped() {
        let engine = engine();
        let mut view = MicroDefectDetection::new(&engine);
        assert_eq!(view.magnification(), 1000);
        view.set_magnification(50);
        assert_eq!(view.magnification(), 100);
        view.set_magnification(50_000);
        assert_eq!(view.magnification(), 10_000);
    }
}
