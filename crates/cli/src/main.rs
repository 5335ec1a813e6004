// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use kvlog_cli::commands::{inspect, state, verify};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kvlog")]
#[command(about = "Inspect, verify and replay kvlog transaction logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every readable record, and where reading stopped if the log is damaged
    Inspect {
        path: PathBuf,

        /// Treat the path as a SQLite database instead of a line log
        #[arg(long)]
        sqlite: bool,

        #[arg(long)]
        json: bool,
    },
    /// Check ordering and syntax of the whole log; exits non-zero on corruption
    Verify {
        path: PathBuf,

        #[arg(long)]
        sqlite: bool,
    },
    /// Replay the log and print the resulting key/value state
    State {
        path: PathBuf,

        #[arg(long)]
        sqlite: bool,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { path, sqlite, json } => inspect::run(&path, sqlite, json),
        Commands::Verify { path, sqlite } => verify::run(&path, sqlite),
        Commands::State { path, sqlite, json } => state::run(&path, sqlite, json),
    }
}
