// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Requested key is absent from the store.
    #[error("no such key")]
    NoSuchKey,
    /// Keys must be non-empty.
    #[error("key must not be empty")]
    EmptyKey,
    /// Event type outside the encoded range (DELETE=1, PUT=2).
    #[error("invalid event type: {0}")]
    InvalidEventType(i64),
    /// A replayed sequence number did not strictly increase.
    #[error("transaction numbers out of sequence: last {last}, found {found}")]
    OutOfSequence { last: u64, found: u64 },
    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
