// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Durable storage for the kvlog transaction log.
//!
//! Two interchangeable media implement [`LogBackend`]:
//! - [`FileBackend`]: newline-delimited, tab-separated records in a flat file
//! - [`SqliteBackend`]: rows in a `transactions` table with an auto-assigned sequence
//!
//! Both stop replay at the first error and enforce strictly increasing
//! sequence numbers.

pub mod error;
pub mod backend;
pub mod record;
pub mod file;
pub mod sqlite;
pub mod fixtures;

pub use backend::{read_all, LogBackend};
pub use error::{PersistenceError, Result};
pub use file::FileBackend;
pub use sqlite::SqliteBackend;
