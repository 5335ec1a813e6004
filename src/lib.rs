// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! kvlog-kernel: the event model and in-memory store behind the kvlog node.
//!
//! Nothing in this crate performs I/O. Backends in `kvlog-persistence`
//! produce and consume [`event::Event`]s, and the node replays them into a
//! [`store::Store`].

pub mod error;
pub mod event;
pub mod store;
pub mod replay;

pub use error::{KernelError, KernelResult};
pub use event::{Event, EventType};
pub use store::Store;

#[cfg(test)]
pub mod tests;
