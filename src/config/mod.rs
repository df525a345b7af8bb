// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Configuration module

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::{NemiError, Result};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log filter directive, e.g. `info` or `nemi=debug,warn`
    pub log_level: String,

    /// Broadcast capacity of the event bus
    pub event_bus_capacity: usize,

    /// Simulation driver configuration
    pub simulation: SimulationConfig,

    /// View-local simulation configuration
    pub views: ViewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "NEMI".to_string(),
            log_level: "info".to_string(),
            event_bus_capacity: 1024,
            simulation: SimulationConfig::default(),
            views: ViewConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Tracing filter built from `log_level`
    pub fn log_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| NemiError::Config(format!("log_level '{}': {}", self.log_level, e)))
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("nemi"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Simulation driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tick interval in milliseconds
    pub interval_ms: u64,

    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,

    /// A detection fires when a uniform draw exceeds this value
    pub detection_threshold: f64,

    /// Upper bound (inclusive) of defects per simulated detection
    pub max_detection_count: u32,

    /// Half-width of the processing-time random walk, in ms
    pub processing_drift_ms: f64,

    /// Processing-time floor, in ms
    pub min_processing_time_ms: f64,

    /// Half-width of the accuracy random walk
    pub accuracy_drift: f64,

    /// Accuracy lower clamp during drift
    pub accuracy_floor: f64,

    /// Accuracy upper clamp
    pub accuracy_ceiling: f64,

    /// Delay before learning nodes return to active, in ms
    pub learning_restore_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            seed: None,
            detection_threshold: 0.7,
            max_detection_count: 3,
            processing_drift_ms: 1.0,
            min_processing_time_ms: 5.0,
            accuracy_drift: 0.1,
            accuracy_floor: 95.0,
            accuracy_ceiling: 99.9,
            learning_restore_ms: 3000,
        }
    }
}

impl SimulationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn learning_restore(&self) -> Duration {
        Duration::from_millis(self.learning_restore_ms)
    }
}

/// View-local simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Points in the dashboard performance timeline
    pub performance_window: usize,

    /// Edge detections kept (newest first)
    pub edge_detection_history: usize,

    /// Federated learning rounds kept
    pub learning_history: usize,

    /// Defects generated per micro-defect scan
    pub micro_defects_per_scan: usize,

    /// Delay between scan progress steps, in ms
    pub scan_step_ms: u64,

    /// Delay between processed camera frames, in ms
    pub frame_interval_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            performance_window: 24,
            edge_detection_history: 10,
            learning_history: 20,
            micro_defects_per_scan: 8,
            scan_step_ms: 100,
            frame_interval_ms: 33,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_create_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, Config::default());

        let mut edited = created.clone();
        edited.simulation.seed = Some(42);
        edited.simulation.interval_ms = 500;
        edited.save(&path).unwrap();

        let loaded = Config::load_or_create(&path).unwrap();
        assert_eq!(loaded.simulation.seed, Some(42));
        assert_eq!(loaded.simulation.interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[simulation]\ndetection_threshold = 0.5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.simulation.detection_threshold, 0.5);
        assert_eq!(config.simulation.interval_ms, 2000);
        assert_eq!(config.views, ViewConfig::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "simulation = 3").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, crate::error::NemiError::Config(_)));
    }

    #[test]
    fn test_log_level_builds_filter() {
        let mut config = Config::default();
        assert!(config.log_filter().is_ok());

        config.log_level = "nemi=debug,warn".to_string();
        assert!(config.log_filter().is_ok());

        config.log_level = "nemi=loud".to_string();
        assert!(matches!(config.log_filter(), Err(NemiError::Config(_))));
    }
}
