//! Debounced reading-progress persistence.
//!
//! Rapid page turns must not turn into a network write per turn. The
//! persister keeps at most one pending write: `schedule` replaces whatever
//! was pending and re-arms the deadline, and `poll` releases the write once
//! the quiet period has elapsed (trailing-edge debounce). Closing a session
//! bypasses the debounce entirely via `take_pending`/an immediate flush.

use crate::comic::Direction;
use std::time::{Duration, Instant};

/// Quiet period before a scheduled progress write is released.
pub const PROGRESS_DEBOUNCE: Duration = Duration::from_millis(500);

/// One idempotent progress upsert, keyed by the comic's local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressWrite {
    pub path: String,
    pub page: usize,
    pub direction: Direction,
}

#[derive(Debug, Default)]
pub struct ProgressPersister {
    pending: Option<(ProgressWrite, Instant)>,
}

impl ProgressPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending write and restart the debounce window.
    pub fn schedule(&mut self, write: ProgressWrite, now: Instant) {
        self.pending = Some((write, now + PROGRESS_DEBOUNCE));
    }

    /// Release the pending write if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ProgressWrite> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(write, _)| write),
            _ => None,
        }
    }

    /// Remove and return the pending write regardless of its deadline.
    /// Used on session close, where the final state is flushed immediately.
    pub fn take_pending(&mut self) -> Option<ProgressWrite> {
        self.pending.take().map(|(write, _)| write)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
