// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod inspect;
pub mod state;
pub mod verify;

use anyhow::{bail, Context};
use kvlog_persistence::{FileBackend, LogBackend, SqliteBackend};
use std::path::Path;

/// Open an existing log for reading.
///
/// Both backends create missing files on open, so absence is checked first:
/// a typo in the path must not leave an empty log behind.
pub fn open_existing(path: &Path, sqlite: bool) -> anyhow::Result<Box<dyn LogBackend>> {
    if !path.exists() {
        bail!("no transaction log at {}", path.display());
    }

    let backend: Box<dyn LogBackend> = if sqlite {
        Box::new(SqliteBackend::open(path).with_context(|| format!("opening database {}", path.display()))?)
    } else {
        Box::new(FileBackend::open(path).with_context(|| format!("opening log {}", path.display()))?)
    };
    Ok(backend)
}
