// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Crash Recovery Demo
//!
//! Writes through the transaction log, restarts from the log, then shows
//! startup refusing a corrupted log.

use kvlog_kernel::Store;
use kvlog_node::events::DEFAULT_QUEUE_CAPACITY;
use kvlog_node::recovery;
use kvlog_persistence::FileBackend;
use std::io::Write;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("\n╔════════════════════════════════════════╗");
    println!("║  kvlog Crash Recovery Demo             ║");
    println!("╚════════════════════════════════════════╝\n");

    let dir = tempdir()?;
    let log_path = dir.path().join("transactions.log");

    // Phase 1: live writes
    println!("📝 Phase 1: PUT a=1, PUT a=2, DELETE a, PUT b=9");
    {
        let store = Store::new();
        let logger = recovery::initialize(&store, Box::new(FileBackend::open(&log_path)?), DEFAULT_QUEUE_CAPACITY).await?;

        store.put("a", "1")?;
        logger.write_put("a", "1").await;
        store.put("a", "2")?;
        logger.write_put("a", "2").await;
        store.delete("a")?;
        logger.write_delete("a").await;
        store.put("b", "9")?;
        logger.write_put("b", "9").await;

        logger.shutdown().await?;
    }
    println!("   ✅ Log on disk:\n{}", std::fs::read_to_string(&log_path)?);

    // Phase 2: restart
    println!("📝 Phase 2: restart and replay");
    {
        let store = Store::new();
        let logger = recovery::initialize(&store, Box::new(FileBackend::open(&log_path)?), DEFAULT_QUEUE_CAPACITY).await?;
        println!("   a -> {:?}", store.get("a"));
        println!("   b -> {:?}", store.get("b"));
        logger.shutdown().await?;
    }

    // Phase 3: corrupt and restart
    println!("\n📝 Phase 3: append a record that reuses sequence 2");
    {
        let mut file = std::fs::OpenOptions::new().append(true).open(&log_path)?;
        file.write_all(b"2\t2\tc\tghost\n")?;
    }
    let store = Store::new();
    match recovery::initialize(&store, Box::new(FileBackend::open(&log_path)?), DEFAULT_QUEUE_CAPACITY).await {
        Ok(_) => println!("   ❌ corrupted log was accepted"),
        Err(e) => println!("   ✅ startup refused: {}", e),
    }

    Ok(())
}
