// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Startup Recovery
//!
//! Replay-then-serve protocol:
//!
//! ```text
//! INIT -> REPLAYING -> LIVE
//!             |
//!             +-> FAILED
//! ```
//!
//! # Invariants
//! - Every historical event is applied, in order, before the pump starts
//! - Any replay error aborts startup; a partially rebuilt store is never served
//! - The store is not handed to request handling until LIVE

use crate::events::{LoggerError, TransactionLogger};
use kvlog_kernel::store::digest_prefix;
use kvlog_kernel::{KernelError, Store};
use kvlog_persistence::LogBackend;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    Init,
    Replaying,
    Live,
    Failed,
}

impl fmt::Display for StartupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupPhase::Init => "INIT",
            StartupPhase::Replaying => "REPLAYING",
            StartupPhase::Live => "LIVE",
            StartupPhase::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("replay failed after {applied} events: {source}")]
    Replay {
        applied: u64,
        #[source]
        source: LoggerError,
    },

    #[error("replayed event #{sequence} could not be applied: {source}")]
    Apply {
        sequence: u64,
        #[source]
        source: KernelError,
    },

    #[error("failed to start transaction log pump: {0}")]
    Start(#[source] LoggerError),
}

struct Startup {
    phase: StartupPhase,
}

impl Startup {
    fn new() -> Self {
        tracing::debug!("Startup phase {}", StartupPhase::Init);
        Self {
            phase: StartupPhase::Init,
        }
    }

    fn enter(&mut self, next: StartupPhase) {
        tracing::info!("Startup phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn fail(&mut self, err: RecoveryError) -> RecoveryError {
        tracing::error!("Startup aborted during {}: {}", self.phase, err);
        self.enter(StartupPhase::Failed);
        err
    }
}

/// Rebuild `store` from `backend` and bring the transaction log live.
///
/// On success the returned logger's pump is running and the caller may
/// start serving requests. On failure the store may hold a prefix of the
/// history and must be discarded.
pub async fn initialize(
    store: &Store,
    backend: Box<dyn LogBackend>,
    capacity: usize,
) -> Result<TransactionLogger, RecoveryError> {
    let mut startup = Startup::new();
    let mut logger = TransactionLogger::new(backend, capacity);

    startup.enter(StartupPhase::Replaying);
    let started = Instant::now();

    let applied = match replay_into(&mut logger, store).await {
        Ok(applied) => applied,
        Err(e) => return Err(startup.fail(e)),
    };

    metrics::histogram!("kvlog_replay_duration_seconds", started.elapsed().as_secs_f64());
    metrics::counter!("kvlog_events_replayed_total", applied);

    match store.len().and_then(|keys| Ok((keys, store.digest()?))) {
        Ok((keys, digest)) => tracing::info!(
            "Replayed {} events from {} backend in {:?}. {} keys, state digest {}",
            applied,
            logger.backend_name(),
            started.elapsed(),
            keys,
            digest_prefix(&digest)
        ),
        Err(e) => tracing::warn!("Replayed {} events but could not digest store: {}", applied, e),
    }

    if let Err(e) = logger.run().await {
        return Err(startup.fail(RecoveryError::Start(e)));
    }
    startup.enter(StartupPhase::Live);
    metrics::gauge!("kvlog_log_healthy", 1.0);

    Ok(logger)
}

/// Drain a replay into `store`, applying events in the order received.
async fn replay_into(logger: &mut TransactionLogger, store: &Store) -> Result<u64, RecoveryError> {
    let mut events = logger.read_events().await.map_err(|source| RecoveryError::Replay {
        applied: 0,
        source,
    })?;

    let mut applied = 0;
    while let Some(item) = events.next().await {
        let event = item.map_err(|source| RecoveryError::Replay { applied, source })?;
        store.apply(&event).map_err(|source| RecoveryError::Apply {
            sequence: event.sequence,
            source,
        })?;
        applied += 1;
    }

    Ok(applied)
}
