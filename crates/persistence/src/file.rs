// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Flat-file transaction log.
//!
//! One record per line, appended and fsync'd one at a time. Replay opens a
//! fresh reader from the start of the file.

use crate::backend::LogBackend;
use crate::error::{PersistenceError, Result};
use crate::record;
use kvlog_kernel::replay::SequenceGuard;
use kvlog_kernel::{Event, KernelError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

pub struct FileBackend {
    path: PathBuf,
    file: File,
    last_sequence: u64,
}

impl FileBackend {
    /// Open or create the log at `path`.
    ///
    /// The sequence counter starts at zero; replay the log before appending
    /// to an existing file so new records continue its numbering.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        tracing::debug!("Opened transaction log file {:?}", path);

        Ok(Self {
            path,
            file,
            last_sequence: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    fn append(&mut self, event: &Event) -> Result<u64> {
        if event.key.is_empty() {
            return Err(PersistenceError::InvalidEvent(KernelError::EmptyKey));
        }

        let sequence = self.last_sequence + 1;
        let line = record::encode_record(sequence, event);

        self.file.write_all(line.as_bytes())?;
        self.file.sync_data()?;

        self.last_sequence = sequence;
        Ok(sequence)
    }

    fn replay(&mut self, sink: &mut dyn FnMut(Event) -> ControlFlow<()>) -> Result<u64> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut guard = SequenceGuard::new();
        let mut delivered = 0;

        self.last_sequence = 0;

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(PersistenceError::Read)?;
            let event = record::decode_line(&line, idx as u64 + 1)?;

            guard.observe(&event)?;
            self.last_sequence = guard.last();
            delivered += 1;

            if sink(event).is_break() {
                break;
            }
        }

        tracing::debug!(
            "Replayed {} events from {:?} (last sequence {})",
            delivered,
            self.path,
            self.last_sequence
        );

        Ok(delivered)
    }
}
