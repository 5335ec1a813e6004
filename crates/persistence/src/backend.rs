// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Storage medium abstraction.

use crate::error::{PersistenceError, Result};
use kvlog_kernel::Event;
use std::ops::ControlFlow;

/// A durable, append-only home for [`Event`]s.
///
/// Every mutating call takes `&mut self`: a backend is driven by exactly one
/// worker at a time (the replay producer, then the append pump), and the
/// owner moves it between them. `last_sequence` therefore needs no lock.
pub trait LogBackend: Send + 'static {
    /// Short medium name for logs ("file", "sqlite").
    fn name(&self) -> &'static str;

    /// Highest sequence this backend has assigned or replayed.
    fn last_sequence(&self) -> u64;

    /// Persist one event and return the sequence it was stored under.
    ///
    /// The event's own `sequence` is ignored. On failure nothing is
    /// recorded and `last_sequence` is unchanged.
    fn append(&mut self, event: &Event) -> Result<u64>;

    /// Stream every stored event, oldest first, into `sink`.
    ///
    /// Reading restarts from the beginning of the medium and recomputes
    /// `last_sequence`. The first parse, read or ordering failure ends the
    /// replay and is returned; no event after it is delivered. A sink that
    /// returns `Break` ends the replay early without error. Returns the
    /// number of events delivered.
    fn replay(&mut self, sink: &mut dyn FnMut(Event) -> ControlFlow<()>) -> Result<u64>;
}

/// Replay everything into memory.
///
/// Events delivered before a failure are returned alongside it.
pub fn read_all(backend: &mut dyn LogBackend) -> (Vec<Event>, Option<PersistenceError>) {
    let mut events = Vec::new();
    let outcome = backend.replay(&mut |event| {
        events.push(event);
        ControlFlow::Continue(())
    });
    (events, outcome.err())
}
