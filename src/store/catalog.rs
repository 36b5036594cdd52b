//! Store Catalog
//!
//! A set of independent named stores sharing one data directory.
//!
//! ```text
//! {dir}/
//!   ├── contact-list.db
//!   ├── users.db
//!   └── ...
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::KvStore;
use crate::config::Config;
use crate::error::{QuickKvError, Result};

/// Named stores, each with its own lock and default path `{dir}/{name}.db`
pub struct StoreCatalog {
    dir: PathBuf,
    stores: BTreeMap<String, Arc<KvStore>>,
}

impl StoreCatalog {
    /// File extension for catalog stores
    pub const EXTENSION: &'static str = "db";

    /// Create the directory if needed, then open one store per name
    ///
    /// Stores whose file already exists are loaded from it.
    pub fn open<I, S>(dir: impl AsRef<Path>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| QuickKvError::file(&dir, e))?;

        let mut catalog = Self {
            dir,
            stores: BTreeMap::new(),
        };

        for name in names {
            catalog.add(name)?;
        }

        tracing::info!(
            "opened {} stores in {}",
            catalog.stores.len(),
            catalog.dir.display()
        );
        Ok(catalog)
    }

    /// Open (or return the already open) store `name`
    pub fn add(&mut self, name: impl Into<String>) -> Result<Arc<KvStore>> {
        let name = name.into();
        Self::validate_name(&name)?;

        if let Some(store) = self.stores.get(&name) {
            return Ok(Arc::clone(store));
        }

        let path = self.path_for(&name);
        let store = Arc::new(KvStore::with_config(
            Config::builder().default_path(&path).build(),
        ));

        if path.exists() && !store.read_default() {
            tracing::warn!("store {} could not be loaded from {}", name, path.display());
        }
        tracing::debug!("store {} size {}", name, store.size());

        self.stores.insert(name, Arc::clone(&store));
        Ok(store)
    }

    pub fn get(&self, name: &str) -> Option<Arc<KvStore>> {
        self.stores.get(name).cloned()
    }

    /// Store names, ascending
    pub fn names(&self) -> Vec<&str> {
        self.stores.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entry count per store
    pub fn sizes(&self) -> BTreeMap<String, usize> {
        self.stores
            .iter()
            .map(|(name, store)| (name.clone(), store.size()))
            .collect()
    }

    /// Flush every dirty store; returns the names that failed to write
    pub fn flush_all(&self) -> Vec<String> {
        self.stores
            .iter()
            .filter(|(_, store)| !store.flush())
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, Self::EXTENSION))
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(QuickKvError::Config(format!("invalid store name: {:?}", name)));
        }
        Ok(())
    }
}
