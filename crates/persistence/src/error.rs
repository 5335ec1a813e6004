// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use kvlog_kernel::KernelError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The medium could not be opened or written.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Sequential read of the log failed mid-stream.
    #[error("transaction log read failure: {0}")]
    Read(io::Error),

    #[error("input parse error at record {record}: {reason}")]
    Parse { record: u64, reason: String },

    #[error("transaction numbers out of sequence: last {last}, found {found}")]
    OutOfSequence { last: u64, found: u64 },

    #[error("invalid event: {0}")]
    InvalidEvent(KernelError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("error reading row {row}: {source}")]
    Row { row: u64, source: rusqlite::Error },
}

impl PersistenceError {
    /// True for failures that mean the stored log itself is damaged.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PersistenceError::Parse { .. }
                | PersistenceError::OutOfSequence { .. }
                | PersistenceError::Row { .. }
        )
    }
}

impl From<KernelError> for PersistenceError {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::OutOfSequence { last, found } => PersistenceError::OutOfSequence { last, found },
            other => PersistenceError::InvalidEvent(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
