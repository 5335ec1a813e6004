// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Relational transaction log.
//!
//! Events live in a `transactions` table whose `sequence` column is
//! allocated by the database (`AUTOINCREMENT`, never reused). Replay reads
//! the table in ascending `sequence` order and applies the same ordering
//! guard and stop-on-first-error policy as the file backend.

use crate::backend::LogBackend;
use crate::error::{PersistenceError, Result};
use kvlog_kernel::replay::SequenceGuard;
use kvlog_kernel::{Event, EventType, KernelError};
use rusqlite::{params, Connection, Row};
use std::ops::ControlFlow;
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS transactions (
        sequence   INTEGER PRIMARY KEY AUTOINCREMENT,
        event_type INTEGER NOT NULL,
        key        TEXT    NOT NULL,
        value      TEXT    NOT NULL
    );
";

const INSERT: &str = "INSERT INTO transactions (event_type, key, value) VALUES (?1, ?2, ?3)";

const SELECT_ALL: &str = "SELECT sequence, event_type, key, value FROM transactions ORDER BY sequence";

pub struct SqliteBackend {
    conn: Connection,
    last_sequence: u64,
}

impl SqliteBackend {
    /// Open (or create) a database file and make sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::debug!("Opened transaction database {:?}", path.as_ref());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            last_sequence: 0,
        })
    }

    /// Direct access for tooling and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn decode_row(row: &Row<'_>, row_no: u64) -> Result<Event> {
    let scan = move |source: rusqlite::Error| PersistenceError::Row { row: row_no, source };
    let parse = move |reason: String| PersistenceError::Parse { record: row_no, reason };

    let sequence: i64 = row.get(0).map_err(scan)?;
    let raw_type: i64 = row.get(1).map_err(scan)?;
    let key: String = row.get(2).map_err(scan)?;
    let value: String = row.get(3).map_err(scan)?;

    let sequence = u64::try_from(sequence).map_err(|_| parse(format!("negative sequence {}", sequence)))?;
    let event_type = EventType::try_from(raw_type).map_err(|e| parse(e.to_string()))?;
    if key.is_empty() {
        return Err(parse("empty key".to_string()));
    }

    Ok(Event {
        sequence,
        event_type,
        key,
        value,
    })
}

impl LogBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    fn append(&mut self, event: &Event) -> Result<u64> {
        if event.key.is_empty() {
            return Err(PersistenceError::InvalidEvent(KernelError::EmptyKey));
        }

        self.conn.execute(
            INSERT,
            params![event.event_type.code() as i64, event.key, event.value],
        )?;

        let rowid = self.conn.last_insert_rowid();
        let sequence = u64::try_from(rowid).map_err(|_| PersistenceError::Parse {
            record: 0,
            reason: format!("database assigned negative sequence {}", rowid),
        })?;

        self.last_sequence = sequence;
        Ok(sequence)
    }

    fn replay(&mut self, sink: &mut dyn FnMut(Event) -> ControlFlow<()>) -> Result<u64> {
        let mut stmt = self.conn.prepare(SELECT_ALL)?;
        let mut rows = stmt.query([])?;
        let mut guard = SequenceGuard::new();
        let mut delivered = 0;

        self.last_sequence = 0;

        while let Some(row) = rows.next()? {
            let event = decode_row(row, delivered + 1)?;

            guard.observe(&event)?;
            self.last_sequence = guard.last();
            delivered += 1;

            if sink(event).is_break() {
                break;
            }
        }

        tracing::debug!(
            "Replayed {} events from transactions table (last sequence {})",
            delivered,
            self.last_sequence
        );

        Ok(delivered)
    }
}
