// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::open_existing;
use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use kvlog_kernel::replay::replay_into;
use kvlog_kernel::store::digest_prefix;
use kvlog_kernel::Store;
use kvlog_persistence::read_all;
use std::path::Path;

/// Rebuild the store a node would start with.
///
/// Fails on a damaged log, exactly as node startup would.
pub fn rebuild(path: &Path, sqlite: bool) -> anyhow::Result<Store> {
    let mut backend = open_existing(path, sqlite)?;
    let (events, error) = read_all(backend.as_mut());
    if let Some(e) = error {
        anyhow::bail!("replay stopped after {} records: {}", events.len(), e);
    }

    let store = Store::new();
    replay_into(&store, &events).context("applying replayed events")?;
    Ok(store)
}

pub fn run(path: &Path, sqlite: bool, json: bool) -> anyhow::Result<()> {
    let store = rebuild(path, sqlite)?;
    let entries = store.entries()?;
    let digest = store.digest()?;

    if json {
        let body = serde_json::json!({
            "entries": entries,
            "digest": digest_prefix(&digest),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Value"]);
    for (key, value) in &entries {
        table.add_row(vec![key.as_str(), value.as_str()]);
    }

    println!("\nReplayed State\n");
    println!("{table}\n");
    println!("{} keys, digest {}\n", entries.len(), digest_prefix(&digest));

    Ok(())
}
