// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Edge processing - simulated inference over a camera feed

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::{AlertLevel, Engine};
use crate::error::{NemiError, Result};
use crate::sim::{self, EdgeDetection, SimRng};
use crate::store::Action;

/// Node id the edge view reports detections against
pub const EDGE_DEMO_NODE: &str = "edge-demo-node";

/// Negotiated capture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self { width: 640, height: 480 }
    }
}

/// A capture device feeding the edge view
#[async_trait]
pub trait CameraSource: Send {
    /// Acquire the device; fails when unavailable or permission is denied
    async fn open(&mut self, requested: FrameFormat) -> Result<FrameFormat>;

    /// Release the device; idempotent
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Camera that produces no pixels; only tracks acquisition
pub struct SimulatedCamera {
    permission_granted: bool,
    open: bool,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self { permission_granted: true, open: false }
    }

    pub fn denied() -> Self {
        Self { permission_granted: false, open: false }
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraSource for SimulatedCamera {
    async fn open(&mut self, requested: FrameFormat) -> Result<FrameFormat> {
        if !self.permission_granted {
            return Err(NemiError::CameraUnavailable("permission denied".to_string()));
        }
        self.open = true;
        Ok(requested)
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub fps: u32,
    /// Milliseconds, one decimal
    pub processing_time: f64,
    pub total_frames: u64,
    pub detection_count: u64,
}

/// Per-frame pipeline shared with the frame loop task
struct FrameProcessor {
    engine: Arc<Engine>,
    format: FrameFormat,
    history: usize,
    rng: Mutex<SimRng>,
    detections: Mutex<VecDeque<EdgeDetection>>,
    stats: Mutex<ProcessingStats>,
}

impl FrameProcessor {
    async fn process_frame(&self) -> Option<EdgeDetection> {
        let started = Instant::now();

        let latency_ms = self.rng.lock().gen_range(5.0..15.0);
        tokio::time::sleep(Duration::from_secs_f64(latency_ms / 1000.0)).await;

        let detection = sim::frame_detection(
            &mut self.rng.lock(),
            f64::from(self.format.width),
            f64::from(self.format.height),
            Utc::now(),
        );

        if let Some(d) = &detection {
            let mut detections = self.detections.lock();
            detections.push_front(d.clone());
            detections.truncate(self.history);
        }

        let elapsed_ms = (started.elapsed().as_secs_f64() * 1000.0).max(latency_ms);
        {
            let mut stats = self.stats.lock();
            stats.fps = (1000.0 / elapsed_ms).round() as u32;
            stats.processing_time = (elapsed_ms * 10.0).round() / 10.0;
            stats.total_frames += 1;
            stats.detection_count += u64::from(detection.is_some());
        }

        if let Some(d) = &detection {
            debug!("frame detection {}", d.label());
            self.engine.store().dispatch(Action::add_defects(EDGE_DEMO_NODE, 1));
            self.engine.event_bus().publish_detection(d.clone());
        }

        detection
    }
}

/// Edge processing view; owns the camera and the frame loop
pub struct EdgeProcessing {
    camera: Box<dyn CameraSource>,
    processor: Arc<FrameProcessor>,
    frame_interval: Duration,
    frame_task: Option<JoinHandle<()>>,
}

impl EdgeProcessing {
    pub fn new(engine: Arc<Engine>, camera: Box<dyn CameraSource>) -> Self {
        let views = &engine.config.views;
        let frame_interval = Duration::from_millis(views.frame_interval_ms);
        let history = views.edge_detection_history;
        let rng = engine.fork_rng();

        Self {
            camera,
            processor: Arc::new(FrameProcessor {
                engine,
                format: FrameFormat::default(),
                history,
                rng: Mutex::new(rng),
                detections: Mutex::new(VecDeque::new()),
                stats: Mutex::new(ProcessingStats::default()),
            }),
            frame_interval,
            frame_task: None,
        }
    }

    /// Acquire the camera and begin processing frames.
    ///
    /// On failure nothing starts and the error is surfaced to the caller.
    pub async fn start_stream(&mut self) -> Result<FrameFormat> {
        if self.is_streaming() {
            return Ok(self.processor.format);
        }

        let format = match self.camera.open(self.processor.format).await {
            Ok(format) => format,
            Err(e) => {
                warn!("Unable to access camera: {}", e);
                self.processor
                    .engine
                    .event_bus()
                    .publish_alert(AlertLevel::Error, "Unable to access camera. Please check permissions.");
                return Err(e);
            }
        };

        let processor = self.processor.clone();
        let interval = self.frame_interval;
        self.frame_task = Some(tokio::spawn(async move {
            loop {
                processor.process_frame().await;
                tokio::time::sleep(interval).await;
            }
        }));

        info!("Edge stream started at {}x{}", format.width, format.height);
        Ok(format)
    }

    /// Cancel the frame loop and release the camera; idempotent
    pub fn stop_stream(&mut self) {
        if let Some(task) = self.frame_task.take() {
            task.abort();
            info!("Edge stream stopped");
        }
        self.camera.close();
    }

    pub fn is_streaming(&self) -> bool {
        self.frame_task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    pub fn camera_open(&self) -> bool {
        self.camera.is_open()
    }

    /// Newest first
    pub fn detections(&self) -> Vec<EdgeDetection> {
        self.processor.detections.lock().iter().cloned().collect()
    }

    pub fn stats(&self) -> ProcessingStats {
        *self.processor.stats.lock()
    }

    /// Process a single frame outside the loop
    pub async fn process_frame(&self) -> Option<EdgeDetection> {
        self.processor.process_frame().await
    }
}

impl Drop for EdgeProcessing {
    fn drop(&mut self) {
        self.stop_stream();
    }
}
