// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::open_existing;
use kvlog_persistence::PersistenceError;
use std::ops::ControlFlow;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    pub records: u64,
    pub last_sequence: u64,
}

/// Read the whole log through the same checks startup replay applies.
pub fn check(path: &Path, sqlite: bool) -> anyhow::Result<Verified> {
    let mut backend = open_existing(path, sqlite)?;

    let records = backend
        .replay(&mut |_| ControlFlow::Continue(()))
        .map_err(|e: PersistenceError| {
            if e.is_corruption() {
                anyhow::anyhow!("log is corrupted: {}", e)
            } else {
                anyhow::anyhow!("log could not be read: {}", e)
            }
        })?;

    Ok(Verified {
        records,
        last_sequence: backend.last_sequence(),
    })
}

pub fn run(path: &Path, sqlite: bool) -> anyhow::Result<()> {
    match check(path, sqlite) {
        Ok(verified) => {
            println!("\n✅ VERIFIED\n");
            println!("Records:       {}", verified.records);
            println!("Last sequence: {}\n", verified.last_sequence);
            Ok(())
        }
        Err(e) => {
            println!("\n❌ REJECTED\n");
            println!("{}\n", e);
            Err(e)
        }
    }
}
