// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! State store - the single owner of the system snapshot

mod action;
mod reducer;

pub use action::Action;
pub use reducer::{reduce, LEARNING_ROUND_GAIN};

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::trace;

use crate::core::EventBus;
use crate::model::NemiState;

/// Owned state container; the snapshot changes only through [`Store::dispatch`]
pub struct Store {
    state_tx: watch::Sender<Arc<NemiState>>,
    dispatch_lock: Mutex<()>,
    event_bus: Option<Arc<EventBus>>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(NemiState::default())
    }

    pub fn with_state(state: NemiState) -> Self {
        let (state_tx, _) = watch::channel(Arc::new(state));
        Self {
            state_tx,
            dispatch_lock: Mutex::new(()),
            event_bus: None,
        }
    }

    /// Publish every dispatched action on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Apply `action` and notify subscribers if the snapshot changed.
    ///
    /// Dispatches are serialized: concurrent callers observe transitions in
    /// one total order, never a partially applied one.
    pub fn dispatch(&self, action: Action) {
        let _guard = self.dispatch_lock.lock();
        let now = Utc::now();

        let changed = self.state_tx.send_if_modified(|state| {
            let next = reduce(&**state, &action, now);
            if next == **state {
                false
            } else {
                *state = Arc::new(next);
                true
            }
        });
        trace!("dispatched {} (changed: {})", action.kind(), changed);

        if let Some(bus) = &self.event_bus {
            bus.publish_action(action);
        }
    }

    /// Latest snapshot; treat as immutable
    pub fn snapshot(&self) -> Arc<NemiState> {
        self.state_tx.borrow().clone()
    }

    /// Receiver notified after every state-changing dispatch
    pub fn subscribe(&self) -> watch::Receiver<Arc<NemiState>> {
        self.state_tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.state_tx.borrow().is_system_active
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
