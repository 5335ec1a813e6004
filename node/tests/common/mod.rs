// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![allow(dead_code)]

use kvlog_kernel::replay::SequenceGuard;
use kvlog_kernel::Event;
use kvlog_persistence::{LogBackend, PersistenceError};
use std::io;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

/// Appended events, shared with the test after the backend moves away.
pub type Journal = Arc<Mutex<Vec<Event>>>;

/// In-memory backend with injectable failures.
pub struct RecordingBackend {
    journal: Journal,
    history: Vec<Event>,
    replay_error_at: Option<usize>,
    fail_after: Option<usize>,
    last_sequence: u64,
}

impl RecordingBackend {
    pub fn new() -> (Self, Journal) {
        let journal = Journal::default();
        let backend = Self {
            journal: journal.clone(),
            history: Vec::new(),
            replay_error_at: None,
            fail_after: None,
            last_sequence: 0,
        };
        (backend, journal)
    }

    /// Events served by `replay`, numbered 1..
    pub fn with_history(mut self, events: Vec<Event>) -> Self {
        self.history = events
            .into_iter()
            .enumerate()
            .map(|(i, e)| e.with_sequence(i as u64 + 1))
            .collect();
        self
    }

    /// Replay fails with a parse error instead of yielding event `index`.
    pub fn with_replay_error_at(mut self, index: usize) -> Self {
        self.replay_error_at = Some(index);
        self
    }

    /// Appends fail once `count` events have been stored.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

impl LogBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    fn append(&mut self, event: &Event) -> kvlog_persistence::Result<u64> {
        let mut journal = self.journal.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if journal.len() >= limit {
                return Err(PersistenceError::IoError(io::Error::new(io::ErrorKind::Other, "disk full")));
            }
        }

        let sequence = self.last_sequence + 1;
        journal.push(event.clone().with_sequence(sequence));
        self.last_sequence = sequence;
        Ok(sequence)
    }

    fn replay(&mut self, sink: &mut dyn FnMut(Event) -> ControlFlow<()>) -> kvlog_persistence::Result<u64> {
        let mut guard = SequenceGuard::new();
        let mut delivered = 0;
        self.last_sequence = 0;

        for (i, event) in self.history.iter().enumerate() {
            if self.replay_error_at == Some(i) {
                return Err(PersistenceError::Parse {
                    record: i as u64 + 1,
                    reason: "injected".to_string(),
                });
            }
            guard.observe(event)?;
            self.last_sequence = guard.last();
            delivered += 1;
            if sink(event.clone()).is_break() {
                break;
            }
        }
        Ok(delivered)
    }
}

pub fn keys(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().iter().map(|e| e.key.clone()).collect()
}

pub fn sequences(journal: &Journal) -> Vec<u64> {
    journal.lock().unwrap().iter().map(|e| e.sequence).collect()
}
