//! Single-slot handoff between the detection feed and the render tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Holds only the most recent value.
///
/// The producer overwrites whatever is in the slot; the consumer takes it
/// without waiting. A value overwritten before it was taken is dropped and
/// counted, never queued.
#[derive(Debug)]
pub struct LatestCell<T> {
    slot: Mutex<Option<T>>,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl<T> LatestCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Store a value, replacing any value not yet taken.
    pub fn publish(&self, value: T) {
        let stale = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(value);

        self.published.fetch_add(1, Ordering::Relaxed);
        if stale.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take the latest value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Total values ever published
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Values overwritten before the consumer saw them
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> Default for LatestCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
