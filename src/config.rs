//! Configuration for QuickKV
//!
//! Store-scoped configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{QuickKvError, Result};

/// Configuration for a single `KvStore` instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// File used by the path-less `read_default`/`write_default`/`append`
    pub default_path: PathBuf,

    /// Whether `read_default` empties the map before loading
    pub clear_on_read: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("./quickkv.db"),
            clear_on_read: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations that could never be persisted
    pub fn validate(&self) -> Result<()> {
        if self.default_path.as_os_str().is_empty() {
            return Err(QuickKvError::Config("default_path is empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the default file path
    pub fn default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.default_path = path.into();
        self
    }

    /// Set whether `read_default` replaces (true) or merges into (false) the map
    pub fn clear_on_read(mut self, clear: bool) -> Self {
        self.config.clear_on_read = clear;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
