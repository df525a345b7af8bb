// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Event bus: one ordered broadcast stream of store actions, detections,
//! alerts and errors

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::sim::EdgeDetection;
use crate::store::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    Action(Action),
    Detection(EdgeDetection),
    Alert { level: AlertLevel, message: String },
    Error { code: u32, message: String },
}

/// Discriminant used to filter a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Action,
    Detection,
    Alert,
    Error,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Action(_) => EventKind::Action,
            EventPayload::Detection(_) => EventKind::Detection,
            EventPayload::Alert { .. } => EventKind::Alert,
            EventPayload::Error { .. } => EventKind::Error,
        }
    }
}

/// Published event; `seq` is unique and increasing per bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub payload: EventPayload,
}

/// Receiver that skips events outside its kind set.
///
/// Lag is reported as-is so callers can decide whether to resync.
pub struct Subscription {
    rx: broadcast::Receiver<Event>,
    kinds: &'static [EventKind],
}

impl Subscription {
    pub async fn recv(&mut self) -> Result<Event, RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if self.kinds.is_empty() || self.kinds.contains(&event.payload.kind()) {
                return Ok(event);
            }
        }
    }
}

pub struct EventBus {
    tx: broadcast::Sender<Event>,
    seq: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, seq: AtomicU64::new(0) }
    }

    pub fn publish(&self, payload: EventPayload) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        // no receivers is fine
        let _ = self.tx.send(Event { seq, at: Utc::now(), payload });
        seq
    }

    pub fn publish_action(&self, action: Action) -> u64 {
        self.publish(EventPayload::Action(action))
    }

    pub fn publish_detection(&self, detection: EdgeDetection) -> u64 {
        self.publish(EventPayload::Detection(detection))
    }

    pub fn publish_alert(&self, level: AlertLevel, message: impl Into<String>) -> u64 {
        self.publish(EventPayload::Alert { level, message: message.into() })
    }

    pub fn publish_error(&self, code: u32, message: impl Into<String>) -> u64 {
        self.publish(EventPayload::Error { code, message: message.into() })
    }

    /// Every event, in publish order
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_to(&[])
    }

    /// Only events whose kind is in `kinds`; an empty set means all
    pub fn subscribe_to(&self, kinds: &'static [EventKind]) -> Subscription {
        Subscription { rx: self.tx.subscribe(), kinds }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
