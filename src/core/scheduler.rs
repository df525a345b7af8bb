// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Task scheduler for timed operations

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Named timers; rescheduling a name replaces the previous timer and every
/// timer is cancelled when the scheduler is dropped.
pub struct Scheduler {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Run `task` once after `delay`. Must be called inside a tokio runtime.
    pub fn schedule_once<F>(&self, name: &str, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        self.insert(name, handle);
        debug!("Scheduled one-shot '{}' in {:?}", name, delay);
    }

    /// Run `task` every `period`, first firing one period from now
    pub fn schedule_every<F>(&self, name: &str, period: Duration, task: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });
        self.insert(name, handle);
        debug!("Scheduled task '{}' with interval {:?}", name, period);
    }

    fn insert(&self, name: &str, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|_, h| !h.is_finished());
        if let Some(previous) = tasks.insert(name.to_string(), handle) {
            previous.abort();
        }
    }

    /// Cancel one timer; returns whether it was still pending
    pub fn cancel(&self, name: &str) -> bool {
        match self.tasks.lock().remove(name) {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let mut tasks = self.tasks.lock();
        for (name, handle) in tasks.drain() {
            if !handle.is_finished() {
                debug!("Cancelled task '{}'", name);
            }
            handle.abort();
        }
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.tasks.lock().get(name).map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.lock().values().filter(|h| !h.is_finished()).count()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.get_mut().drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_once_fires_after_delay() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        scheduler.schedule_once("restore", Duration::from_secs(3), move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_pending("restore"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending("restore"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_not_stacks() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let h = hits.clone();
            scheduler.schedule_once("restore", Duration::from_secs(1), move || {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(scheduler.pending_count(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_and_cancel() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        scheduler.schedule_every("tick", Duration::from_secs(1), move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        assert!(scheduler.cancel("tick"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(!scheduler.cancel("tick"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_everything() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let scheduler = Scheduler::new();
            let h = hits.clone();
            scheduler.schedule_once("late", Duration::from_secs(1), move || {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
