// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory key-value map guarded by a single reader/writer lock.
//!
//! Reads proceed in parallel, a write excludes everything else. The lock
//! covers the map access only; callers never hold it across I/O.

use crate::error::{KernelError, KernelResult};
use crate::event::{Event, EventType};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

#[derive(Default)]
pub struct Store {
    data: RwLock<HashMap<String, String>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: &str) -> KernelResult<()> {
        if key.is_empty() {
            return Err(KernelError::EmptyKey);
        }
        let mut guard = self.data.write().map_err(|_| KernelError::Poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Returns [`KernelError::NoSuchKey`] when the key is absent.
    pub fn get(&self, key: &str) -> KernelResult<String> {
        let guard = self.data.read().map_err(|_| KernelError::Poisoned)?;
        guard.get(key).cloned().ok_or(KernelError::NoSuchKey)
    }

    /// Deleting an absent key is not an error.
    pub fn delete(&self, key: &str) -> KernelResult<()> {
        if key.is_empty() {
            return Err(KernelError::EmptyKey);
        }
        let mut guard = self.data.write().map_err(|_| KernelError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }

    /// Apply a replayed event: PUT -> put, DELETE -> delete.
    pub fn apply(&self, event: &Event) -> KernelResult<()> {
        match event.event_type {
            EventType::Put => self.put(&event.key, &event.value),
            EventType::Delete => self.delete(&event.key),
        }
    }

    pub fn len(&self) -> KernelResult<usize> {
        let guard = self.data.read().map_err(|_| KernelError::Poisoned)?;
        Ok(guard.len())
    }

    pub fn is_empty(&self) -> KernelResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Sorted copy of the current contents.
    pub fn entries(&self) -> KernelResult<BTreeMap<String, String>> {
        let guard = self.data.read().map_err(|_| KernelError::Poisoned)?;
        Ok(guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// BLAKE3 digest of the sorted contents.
    ///
    /// Two stores holding the same pairs produce the same digest regardless
    /// of insertion order.
    pub fn digest(&self) -> KernelResult<[u8; 32]> {
        let entries = self.entries()?;
        let mut hasher = blake3::Hasher::new();
        for (k, v) in &entries {
            hasher.update(&(k.len() as u64).to_le_bytes());
            hasher.update(k.as_bytes());
            hasher.update(&(v.len() as u64).to_le_bytes());
            hasher.update(v.as_bytes());
        }
        Ok(*hasher.finalize().as_bytes())
    }
}

/// Short hex prefix of a digest, for log lines.
pub fn digest_prefix(digest: &[u8; 32]) -> String {
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}
