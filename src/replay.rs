// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Replay rules shared by every backend and consumer.
//!
//! # Monotonicity
//! A reader must see strictly increasing sequence numbers. Gaps are
//! tolerated (1, 2, 4 replays fine); a repeat or a decrease means the log
//! is corrupted and the reader stops.

use crate::error::{KernelError, KernelResult};
use crate::event::Event;
use crate::store::Store;

/// Validate that `next` may follow `last`.
pub fn check_sequence(last: u64, next: u64) -> KernelResult<()> {
    if next <= last {
        return Err(KernelError::OutOfSequence { last, found: next });
    }
    Ok(())
}

/// Tracks the highest sequence seen by a reader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequenceGuard {
    last: u64,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(last: u64) -> Self {
        Self { last }
    }

    /// Accept `event` if its sequence strictly increases, and advance.
    pub fn observe(&mut self, event: &Event) -> KernelResult<()> {
        check_sequence(self.last, event.sequence)?;
        self.last = event.sequence;
        Ok(())
    }

    pub fn last(&self) -> u64 {
        self.last
    }
}

/// Validate and apply a full event sequence, stopping at the first violation.
pub fn replay_into<'a>(store: &Store, events: impl IntoIterator<Item = &'a Event>) -> KernelResult<u64> {
    let mut guard = SequenceGuard::new();
    let mut applied = 0;
    for event in events {
        guard.observe(event)?;
        store.apply(event)?;
        applied += 1;
    }
    Ok(applied)
}
