// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ready-made logs for tests and demos.

use crate::backend::LogBackend;
use crate::error::Result;
use crate::file::FileBackend;
use crate::sqlite::SqliteBackend;
use kvlog_kernel::Event;
use std::fs;
use std::path::{Path, PathBuf};

/// PUT a=1, PUT a=2, DELETE a, PUT b=9. Replaying it leaves only `b = "9"`.
pub fn scenario_events() -> Vec<Event> {
    vec![
        Event::put("a", "1"),
        Event::put("a", "2"),
        Event::delete("a"),
        Event::put("b", "9"),
    ]
}

pub struct ScenarioPaths {
    pub file_log: PathBuf,
    pub sqlite_db: PathBuf,
}

/// Write [`scenario_events`] through both backends under `dir`.
///
/// Logs left in `dir` by an earlier run are replaced, so the scenario is
/// always numbered 1 to 4.
pub fn generate_scenario(dir: &Path) -> Result<ScenarioPaths> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let file_log = dir.join("transactions.log");
    let sqlite_db = dir.join("transactions.db");
    for stale in [&file_log, &sqlite_db] {
        if stale.exists() {
            fs::remove_file(stale)?;
        }
    }

    let mut file = FileBackend::open(&file_log)?;
    let mut sqlite = SqliteBackend::open(&sqlite_db)?;
    for event in scenario_events() {
        file.append(&event)?;
        sqlite.append(&event)?;
    }

    Ok(ScenarioPaths { file_log, sqlite_db })
}

/// Write `lines` verbatim (each followed by a newline), bypassing the codec.
///
/// Used to craft damaged logs.
pub fn write_raw_log(path: &Path, lines: &[&str]) -> Result<()> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}
