// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Transaction Logger
//!
//! Owns the write queue, the append pump and the replay producer for one
//! backend. Writes are fire-and-forget: a caller learns nothing about
//! durability, failures surface only on the error channel.

use crate::events::replay_stream::ReplayStream;
use kvlog_kernel::Event;
use kvlog_persistence::{LogBackend, PersistenceError};
use std::ops::ControlFlow;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Events buffered between the replay producer and its consumer.
const REPLAY_BUFFER: usize = 64;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("transaction log backend error: {0}")]
    Backend(#[from] PersistenceError),

    #[error("transaction logger is already running")]
    AlreadyRunning,

    #[error("transaction log backend is no longer available")]
    BackendLost,

    #[error("transaction log worker failed: {0}")]
    Worker(String),

    #[error("last replay stopped before the end of the log; replay it fully before starting the pump")]
    ReplayIncomplete,
}

/// A backend handed back by a replay producer.
pub(crate) struct Replayed {
    backend: Box<dyn LogBackend>,
    /// The whole medium was read, so `last_sequence` is the stored tail.
    complete: bool,
}

/// Where the backend currently lives.
pub(crate) enum BackendSlot {
    Idle(Box<dyn LogBackend>),
    /// Back from a replay that failed or was abandoned. Its sequence counter
    /// may trail the stored records, so it must not append.
    Unsettled(Box<dyn LogBackend>),
    Replaying(JoinHandle<Replayed>),
    Detached,
}

impl From<Replayed> for BackendSlot {
    fn from(replayed: Replayed) -> Self {
        if replayed.complete {
            BackendSlot::Idle(replayed.backend)
        } else {
            BackendSlot::Unsettled(replayed.backend)
        }
    }
}

/// Cloneable enqueue handle for request handlers.
#[derive(Clone)]
pub struct LogWriter {
    tx: mpsc::Sender<Event>,
}

impl LogWriter {
    pub async fn write_put(&self, key: &str, value: &str) {
        self.enqueue(Event::put(key, value)).await;
    }

    pub async fn write_delete(&self, key: &str) {
        self.enqueue(Event::delete(key)).await;
    }

    /// Waits for queue capacity. Once the pump has halted the event is
    /// dropped; the halt itself was already reported on the error channel.
    async fn enqueue(&self, event: Event) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event).await {
            tracing::warn!(
                "Transaction log pump has stopped; {} {:?} not persisted",
                event.event_type,
                event.key
            );
            metrics::counter!("kvlog_events_dropped_total", 1);
        }
    }
}

pub struct TransactionLogger {
    writer: LogWriter,
    queue: Option<mpsc::Receiver<Event>>,
    errors_tx: Option<mpsc::Sender<LoggerError>>,
    errors_rx: Option<mpsc::Receiver<LoggerError>>,
    backend: BackendSlot,
    backend_name: &'static str,
    pump: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for TransactionLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLogger")
            .field("backend_name", &self.backend_name)
            .finish_non_exhaustive()
    }
}

impl TransactionLogger {
    /// Wrap `backend` with a write queue of `capacity` pending events.
    ///
    /// Writes issued before [`run`](Self::run) are buffered and block once
    /// the queue is full.
    pub fn new(backend: Box<dyn LogBackend>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (errors_tx, errors_rx) = mpsc::channel(1);

        Self {
            writer: LogWriter { tx },
            queue: Some(rx),
            errors_tx: Some(errors_tx),
            errors_rx: Some(errors_rx),
            backend_name: backend.name(),
            backend: BackendSlot::Idle(backend),
            pump: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub fn is_running(&self) -> bool {
        self.pump.is_some()
    }

    /// A handle that enqueues onto this logger's queue.
    pub fn writer(&self) -> LogWriter {
        self.writer.clone()
    }

    pub async fn write_put(&self, key: &str, value: &str) {
        self.writer.write_put(key, value).await;
    }

    pub async fn write_delete(&self, key: &str) {
        self.writer.write_delete(key).await;
    }

    /// The pump's failure channel. Handed out once; holds at most one error.
    pub fn errors(&mut self) -> Option<mpsc::Receiver<LoggerError>> {
        self.errors_rx.take()
    }

    /// Start replaying the backend from the beginning.
    ///
    /// The backend moves onto a blocking producer until the returned stream
    /// reports its end, then comes back to the logger. Only a replay that
    /// reached the end of the log lets [`run`](Self::run) start afterwards.
    pub async fn read_events(&mut self) -> Result<ReplayStream<'_>, LoggerError> {
        let (mut backend, _) = self.take_backend().await?;
        let (tx, rx) = mpsc::channel(REPLAY_BUFFER);

        let handle = tokio::task::spawn_blocking(move || {
            let mut abandoned = false;
            let outcome = backend.replay(&mut |event| match tx.blocking_send(Ok(event)) {
                Ok(()) => ControlFlow::Continue(()),
                // Consumer went away.
                Err(_) => {
                    abandoned = true;
                    ControlFlow::Break(())
                }
            });

            let complete = match outcome {
                Ok(_) => !abandoned,
                Err(e) => {
                    let _ = tx.blocking_send(Err(e));
                    false
                }
            };
            Replayed { backend, complete }
        });

        self.backend = BackendSlot::Replaying(handle);
        Ok(ReplayStream::new(rx, &mut self.backend))
    }

    /// Start the single append pump.
    ///
    /// The pump drains the queue in FIFO order and stops for good on the
    /// first append failure, after forwarding it to [`errors`](Self::errors).
    ///
    /// Refused with [`LoggerError::ReplayIncomplete`] while the last replay
    /// ended early; the backend stays with the logger for another replay.
    pub async fn run(&mut self) -> Result<(), LoggerError> {
        if self.pump.is_some() {
            return Err(LoggerError::AlreadyRunning);
        }

        let (mut backend, settled) = self.take_backend().await?;
        if !settled {
            self.backend = BackendSlot::Unsettled(backend);
            return Err(LoggerError::ReplayIncomplete);
        }
        let mut queue = self.queue.take().ok_or(LoggerError::AlreadyRunning)?;
        let errors = self.errors_tx.take().ok_or(LoggerError::AlreadyRunning)?;

        let handle = tokio::task::spawn_blocking(move || {
            tracing::info!(
                "Transaction log pump started on {} backend (last sequence {})",
                backend.name(),
                backend.last_sequence()
            );

            while let Some(event) = queue.blocking_recv() {
                match backend.append(&event) {
                    Ok(sequence) => {
                        metrics::counter!("kvlog_events_appended_total", 1);
                        tracing::trace!("Appended {} {:?} as #{}", event.event_type, event.key, sequence);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Append failed after sequence {}: {}. Transaction log pump halted.",
                            backend.last_sequence(),
                            e
                        );
                        metrics::counter!("kvlog_append_failures_total", 1);
                        let _ = errors.try_send(LoggerError::Backend(e));
                        return;
                    }
                }
            }

            tracing::info!(
                "Transaction log queue closed at sequence {}; pump exiting",
                backend.last_sequence()
            );
        });

        self.pump = Some(handle);
        Ok(())
    }

    /// Close the queue and wait for the pump to persist what was enqueued.
    ///
    /// The queue closes once every [`LogWriter`] handed out has been dropped.
    /// No timeout is applied.
    pub async fn shutdown(self) -> Result<(), LoggerError> {
        let TransactionLogger { writer, queue, pump, .. } = self;
        drop(writer);
        drop(queue);

        if let Some(handle) = pump {
            handle.await.map_err(|e| LoggerError::Worker(e.to_string()))?;
        }
        Ok(())
    }

    /// Reclaim the backend, and whether its sequence counter matches the log.
    async fn take_backend(&mut self) -> Result<(Box<dyn LogBackend>, bool), LoggerError> {
        match std::mem::replace(&mut self.backend, BackendSlot::Detached) {
            BackendSlot::Idle(backend) => Ok((backend, true)),
            BackendSlot::Unsettled(backend) => Ok((backend, false)),
            BackendSlot::Replaying(handle) => {
                let replayed = handle.await.map_err(|e| LoggerError::Worker(e.to_string()))?;
                Ok((replayed.backend, replayed.complete))
            }
            BackendSlot::Detached if self.pump.is_some() => Err(LoggerError::AlreadyRunning),
            BackendSlot::Detached => Err(LoggerError::BackendLost),
        }
    }
}

/// Log pump failures as they arrive.
///
/// Spawn this as the monitoring consumer of [`TransactionLogger::errors`].
pub async fn watch_errors(mut errors: mpsc::Receiver<LoggerError>) {
    while let Some(e) = errors.recv().await {
        tracing::error!("Transaction log failure, writes are no longer persisted: {}", e);
        metrics::gauge!("kvlog_log_healthy", 0.0);
    }
}
