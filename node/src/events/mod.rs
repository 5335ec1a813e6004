// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Transaction Logging
//!
//! The façade between request handling and the durable log.
//!
//! # Architecture
//! - Writers enqueue events on a bounded FIFO queue (backpressure when full)
//! - One pump drains the queue into the backend, in enqueue order
//! - Replay runs on its own producer worker and streams events back
//!
//! # Guarantees
//! - Append order = enqueue order
//! - The backend is owned by exactly one worker at a time
//! - The first append failure halts the pump and is reported once

pub mod logger;
pub mod replay_stream;

pub use logger::{watch_errors, LogWriter, LoggerError, TransactionLogger, DEFAULT_QUEUE_CAPACITY};
pub use replay_stream::ReplayStream;
