// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Replay stream
//!
//! Each item is either an event or the terminal error, in storage order.
//! A replay ends in exactly one of two ways:
//! - every stored event was yielded, then `None`
//! - some events, one `Err`, then `None`

use crate::events::logger::{BackendSlot, LoggerError};
use kvlog_kernel::Event;
use kvlog_persistence::PersistenceError;
use tokio::sync::mpsc;

/// Consumer side of a replay started by
/// [`TransactionLogger::read_events`](crate::events::TransactionLogger::read_events).
///
/// Borrows the logger, so the pump cannot start while a replay is being read.
pub struct ReplayStream<'a> {
    rx: mpsc::Receiver<Result<Event, PersistenceError>>,
    slot: &'a mut BackendSlot,
    delivered: u64,
    finished: bool,
}

impl<'a> ReplayStream<'a> {
    pub(crate) fn new(rx: mpsc::Receiver<Result<Event, PersistenceError>>, slot: &'a mut BackendSlot) -> Self {
        Self {
            rx,
            slot,
            delivered: 0,
            finished: false,
        }
    }

    /// Wait for the next replayed event.
    pub async fn next(&mut self) -> Option<Result<Event, LoggerError>> {
        if self.finished {
            return None;
        }

        match self.rx.recv().await {
            Some(Ok(event)) => {
                self.delivered += 1;
                Some(Ok(event))
            }
            Some(Err(e)) => {
                self.finish().await;
                Some(Err(LoggerError::Backend(e)))
            }
            None => match self.finish().await {
                Some(e) => Some(Err(e)),
                None => None,
            },
        }
    }

    /// Events yielded so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Hand the backend back to the logger once the producer has exited.
    async fn finish(&mut self) -> Option<LoggerError> {
        self.finished = true;
        self.rx.close();

        match std::mem::replace(&mut *self.slot, BackendSlot::Detached) {
            BackendSlot::Replaying(handle) => match handle.await {
                Ok(replayed) => {
                    *self.slot = BackendSlot::from(replayed);
                    None
                }
                Err(e) => Some(LoggerError::Worker(e.to_string())),
            },
            other => {
                *self.slot = other;
                None
            }
        }
    }
}
