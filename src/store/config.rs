//! Record store configuration

use serde::{Deserialize, Serialize};

/// Where the admissions table lives and how connections are pooled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path, or `:memory:` (default: "admissions.db")
    #[serde(default = "default_path")]
    pub path: String,

    /// Table holding one row per admission (default: "DATOS_ORIGINALES")
    #[serde(default = "default_table")]
    pub table: String,

    /// Number of pooled connections (default: 4, forced to 1 in memory)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// How long a request waits for a free connection (default: 5000 ms)
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_path() -> String {
    "admissions.db".to_string()
}

fn default_table() -> String {
    "DATOS_ORIGINALES".to_string()
}

fn default_pool_size() -> usize {
    4
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            table: default_table(),
            pool_size: default_pool_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// In-memory store, used by tests and demos
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            pool_size: 1,
            ..Default::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Check the settings that are interpolated or sized at startup.
    /// The table name is the only identifier rendered into SQL text.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("store.path must not be empty".to_string());
        }
        if !is_identifier(&self.table) {
            return Err(format!(
                "store.table '{}' is not a plain SQL identifier",
                self.table
            ));
        }
        if self.pool_size == 0 {
            return Err("store.pool_size must be > 0".to_string());
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
