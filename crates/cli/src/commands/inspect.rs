// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::open_existing;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use kvlog_kernel::Event;
use kvlog_persistence::read_all;
use serde::Serialize;
use std::path::Path;

/// Everything readable from a log, plus the failure that stopped reading.
#[derive(Debug, Serialize)]
pub struct LogReport {
    pub backend: &'static str,
    pub events: Vec<Event>,
    pub error: Option<String>,
}

pub fn collect(path: &Path, sqlite: bool) -> anyhow::Result<LogReport> {
    let mut backend = open_existing(path, sqlite)?;
    let (events, error) = read_all(backend.as_mut());

    Ok(LogReport {
        backend: backend.name(),
        events,
        error: error.map(|e| e.to_string()),
    })
}

/// Print every readable record. A damaged log is reported, not treated as a
/// command failure; use `verify` for a pass/fail answer.
pub fn run(path: &Path, sqlite: bool, json: bool) -> anyhow::Result<()> {
    let report = collect(path, sqlite)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Seq", "Type", "Key", "Value"]);

    for event in &report.events {
        table.add_row(vec![
            event.sequence.to_string(),
            event.event_type.to_string(),
            event.key.clone(),
            event.value.clone(),
        ]);
    }

    println!("\nTransaction Log ({}): {}\n", report.backend, path.display());
    println!("{table}\n");

    match &report.error {
        Some(e) => println!("⚠️  Reading stopped after {} records: {}\n", report.events.len(), e),
        None => println!("{} records\n", report.events.len()),
    }

    Ok(())
}
