//! Runtime settings resolved from the config file and command-line flags.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_PATH: &str = "fundmirror.json";
pub const DEFAULT_SQLITE_PATH: &str = "fundmirror.db";
/// Snapshots kept by the SQLite store; older rows are pruned on save.
pub const DEFAULT_SQLITE_HISTORY: usize = 50;
pub const DEFAULT_LOOKUP_URL: &str = "http://fundgz.1234567.com.cn/js";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Json,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown backend '{other}' (expected json or sqlite)")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: PathBuf,
    pub history: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub lookup: LookupSettings,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            storage: StorageSettings {
                backend: StorageBackend::Json,
                path: PathBuf::from(DEFAULT_DATA_PATH),
                history: DEFAULT_SQLITE_HISTORY,
            },
            lookup: LookupSettings {
                base_url: DEFAULT_LOOKUP_URL.to_string(),
                timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
            },
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
