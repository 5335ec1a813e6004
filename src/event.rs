// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Transaction log events.
//!
//! Every store mutation that must survive a restart is expressed as an
//! [`Event`]. Events are immutable once appended; the backend that persists
//! them owns the `sequence` field.
//!
//! # Invariants
//! - Sequence numbers observed by any reader strictly increase
//! - `0` is never a valid sequence number and never a valid event type

use crate::error::{KernelError, KernelResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation recorded by an event.
///
/// Encoded as a small integer on disk and in the relational table. Zero is
/// reserved so a missing type can be detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventType {
    Delete = 1,
    Put = 2,
}

impl EventType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for EventType {
    type Error = KernelError;

    fn try_from(raw: i64) -> KernelResult<Self> {
        match raw {
            1 => Ok(EventType::Delete),
            2 => Ok(EventType::Put),
            other => Err(KernelError::InvalidEventType(other)),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Delete => f.write_str("DELETE"),
            EventType::Put => f.write_str("PUT"),
        }
    }
}

/// A single durable fact about a store mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Assigned by the backend at write time; `0` until then.
    pub sequence: u64,
    pub event_type: EventType,
    pub key: String,
    /// Empty for DELETE.
    pub value: String,
}

impl Event {
    /// An unassigned PUT event.
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            event_type: EventType::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    /// An unassigned DELETE event.
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            event_type: EventType::Delete,
            key: key.into(),
            value: String::new(),
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.sequence != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_codes() {
        assert_eq!(EventType::Delete.code(), 1);
        assert_eq!(EventType::Put.code(), 2);
        assert_eq!(EventType::try_from(1), Ok(EventType::Delete));
        assert_eq!(EventType::try_from(2), Ok(EventType::Put));
    }

    #[test]
    fn test_zero_event_type_rejected() {
        assert_eq!(EventType::try_from(0), Err(KernelError::InvalidEventType(0)));
        assert_eq!(EventType::try_from(3), Err(KernelError::InvalidEventType(3)));
        assert_eq!(EventType::try_from(-1), Err(KernelError::InvalidEventType(-1)));
    }

    #[test]
    fn test_delete_has_empty_value() {
        let e = Event::delete("a");
        assert_eq!(e.event_type, EventType::Delete);
        assert!(e.value.is_empty());
        assert!(!e.is_assigned());
        assert!(e.with_sequence(7).is_assigned());
    }
}
