// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::events::DEFAULT_QUEUE_CAPACITY;
use kvlog_persistence::{FileBackend, LogBackend, PersistenceError, SqliteBackend};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_BIND_ADDR: &str = "KVLOG_BIND_ADDR";
pub const ENV_BACKEND: &str = "KVLOG_BACKEND";
pub const ENV_LOG_PATH: &str = "KVLOG_LOG_PATH";
pub const ENV_QUEUE_CAPACITY: &str = "KVLOG_QUEUE_CAPACITY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to open transaction log: {0}")]
    Backend(#[from] PersistenceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Sqlite,
}

impl BackendKind {
    pub fn default_path(self) -> PathBuf {
        match self {
            BackendKind::File => PathBuf::from("transactions.log"),
            BackendKind::Sqlite => PathBuf::from("transactions.db"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(format!("unknown backend {:?} (expected \"file\" or \"sqlite\")", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub backend: BackendKind,
    pub log_path: PathBuf,
    pub queue_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            backend: BackendKind::File,
            log_path: BackendKind::File.default_path(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `KVLOG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = NodeConfig::default();

        if let Some(raw) = lookup(ENV_BIND_ADDR) {
            cfg.bind_addr = raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: ENV_BIND_ADDR,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Some(raw) = lookup(ENV_BACKEND) {
            cfg.backend = raw.parse().map_err(|reason| ConfigError::Invalid {
                var: ENV_BACKEND,
                value: raw.clone(),
                reason,
            })?;
        }

        cfg.log_path = match lookup(ENV_LOG_PATH) {
            Some(raw) if !raw.trim().is_empty() => PathBuf::from(raw),
            Some(raw) => {
                return Err(ConfigError::Invalid {
                    var: ENV_LOG_PATH,
                    value: raw,
                    reason: "path must not be empty".to_string(),
                })
            }
            None => cfg.backend.default_path(),
        };

        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            cfg.queue_capacity = match raw.parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: ENV_QUEUE_CAPACITY,
                        value: raw,
                        reason: "capacity must be at least 1".to_string(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: ENV_QUEUE_CAPACITY,
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            };
        }

        Ok(cfg)
    }

    /// Open the configured medium. Failure here is fatal at startup.
    pub fn open_backend(&self) -> Result<Box<dyn LogBackend>, ConfigError> {
        let backend: Box<dyn LogBackend> = match self.backend {
            BackendKind::File => Box::new(FileBackend::open(&self.log_path)?),
            BackendKind::Sqlite => Box::new(SqliteBackend::open(&self.log_path)?),
        };
        Ok(backend)
    }
}
