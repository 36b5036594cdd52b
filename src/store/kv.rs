//! KvStore implementation
//!
//! BTreeMap-based store behind a single mutex.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rand::Rng;

use super::codec;
use crate::config::Config;
use crate::error::{QuickKvError, Result};

/// Everything guarded by the store lock
struct StoreState {
    /// Entries in ascending key order
    data: BTreeMap<String, String>,

    /// True while the map holds changes not yet written
    dirty: bool,

    /// Seconds since epoch of the last successful write (0 = never)
    last_write_seconds: u64,

    /// Target of the path-less read/write/append calls
    default_path: PathBuf,
}

/// Thread-safe ordered string map with flat-file persistence
///
/// ## Concurrency Model
///
/// One `parking_lot::Mutex` per store guards the map, the dirty flag, the
/// last-write time and the default path. Every public method holds it for
/// its whole duration, file I/O included, so each call is atomic with respect
/// to every other call on the same store. Separate stores never contend.
///
/// ## Persistence
///
/// Nothing is written implicitly. Unsaved changes are lost when the store is
/// dropped; call `write`, `flush` or `close` to persist them.
pub struct KvStore {
    state: Mutex<StoreState>,

    /// Mode used by `read_default`
    clear_on_read: bool,
}

impl KvStore {
    /// Create an empty store with the default config
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty store with a custom config
    pub fn with_config(config: Config) -> Self {
        Self {
            state: Mutex::new(StoreState {
                data: BTreeMap::new(),
                dirty: false,
                last_write_seconds: 0,
                default_path: config.default_path,
            }),
            clear_on_read: config.clear_on_read,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert or update; true if the key was new
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let mut state = self.state.lock();
        state.dirty = true;
        state.data.insert(key.into(), value.into()).is_none()
    }

    /// Remove a key; true if it existed
    pub fn remove(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        let removed = state.data.remove(key).is_some();
        if removed {
            state.dirty = true;
        }
        removed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, key: &str) -> Option<String> {
        self.state.lock().data.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().data.contains_key(key)
    }

    /// All keys, ascending
    pub fn keys(&self) -> Vec<String> {
        self.keys_where(|_| true)
    }

    /// Keys accepted by `filter`, ascending
    pub fn keys_where<F>(&self, filter: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let state = self.state.lock();
        state
            .data
            .keys()
            .filter(|k| filter(k.as_str()))
            .cloned()
            .collect()
    }

    /// Entries whose VALUE is accepted by `filter`
    pub fn search<F>(&self, filter: F) -> BTreeMap<String, String>
    where
        F: Fn(&str) -> bool,
    {
        let state = self.state.lock();
        state
            .data
            .iter()
            .filter(|(_, v)| filter(v.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copy of every entry
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.state.lock().data.clone()
    }

    /// The `count` entries with the largest keys
    pub fn last(&self, count: usize) -> BTreeMap<String, String> {
        let state = self.state.lock();
        state
            .data
            .iter()
            .rev()
            .take(count)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// A uniformly chosen entry
    pub fn random(&self) -> Result<(String, String)> {
        let state = self.state.lock();
        if state.data.is_empty() {
            return Err(QuickKvError::EmptyStore);
        }

        let idx = rand::thread_rng().gen_range(0..state.data.len());
        state
            .data
            .iter()
            .nth(idx)
            .map(|(k, v)| (k.clone(), v.clone()))
            .ok_or(QuickKvError::EmptyStore)
    }

    pub fn size(&self) -> usize {
        self.state.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().data.is_empty()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load `key=value` lines from `path`
    ///
    /// Returns false (map untouched) if the file can't be opened or read.
    /// With `clear` the map is replaced and the store becomes clean;
    /// otherwise lines are merged in and the dirty flag is left as it was.
    pub fn read(&self, path: impl AsRef<Path>, clear: bool) -> bool {
        let mut state = self.state.lock();
        Self::read_locked(&mut state, path.as_ref(), clear)
    }

    /// `read` from the default path using the configured clear mode
    pub fn read_default(&self) -> bool {
        let mut state = self.state.lock();
        let path = state.default_path.clone();
        Self::read_locked(&mut state, &path, self.clear_on_read)
    }

    /// Write every entry to `path` (truncating), ascending by key
    ///
    /// On success the store becomes clean and the last-write time is updated.
    pub fn write(&self, path: impl AsRef<Path>) -> bool {
        let mut state = self.state.lock();
        Self::write_locked(&mut state, path.as_ref())
    }

    /// `write` to the default path
    pub fn write_default(&self) -> bool {
        let mut state = self.state.lock();
        let path = state.default_path.clone();
        Self::write_locked(&mut state, &path)
    }

    /// Append one line to the default path without touching the map
    pub fn append(&self, key: &str, value: &str) -> Result<()> {
        let state = self.state.lock();
        codec::append_line(&state.default_path, key, value)
    }

    /// Append one line to `path` without touching the map
    pub fn append_to(&self, path: impl AsRef<Path>, key: &str, value: &str) -> Result<()> {
        let _state = self.state.lock();
        codec::append_line(path.as_ref(), key, value)
    }

    /// Write to the default path if dirty; true if the store is now clean
    pub fn flush(&self) -> bool {
        let mut state = self.state.lock();
        if !state.dirty {
            return true;
        }
        let path = state.default_path.clone();
        Self::write_locked(&mut state, &path)
    }

    /// Flush and release the store
    pub fn close(self) -> bool {
        self.flush()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn default_path(&self) -> PathBuf {
        self.state.lock().default_path.clone()
    }

    pub fn set_default_path(&self, path: impl Into<PathBuf>) {
        self.state.lock().default_path = path.into();
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    pub fn last_write_seconds(&self) -> u64 {
        self.state.lock().last_write_seconds
    }

    // =========================================================================
    // Internal (called with the lock held)
    // =========================================================================

    fn read_locked(state: &mut StoreState, path: &Path, clear: bool) -> bool {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("can't open {} for read: {}", path.display(), e);
                return false;
            }
        };

        // Decode into a scratch map so a failed read leaves the store untouched
        let mut loaded = BTreeMap::new();
        let applied = match codec::read_entries(BufReader::new(file), &mut loaded) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("failed reading {}: {}", path.display(), e);
                return false;
            }
        };

        if clear {
            tracing::debug!("clearing the store prior to read");
            state.data = loaded;
            state.dirty = false;
        } else {
            state.data.extend(loaded);
        }

        tracing::info!(
            "read {} lines from {}, store size {}",
            applied,
            path.display(),
            state.data.len()
        );
        true
    }

    fn write_locked(state: &mut StoreState, path: &Path) -> bool {
        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("can't open {} for write: {}", path.display(), e);
                return false;
            }
        };

        let mut writer = BufWriter::new(file);
        if let Err(e) = codec::write_entries(&mut writer, &state.data) {
            tracing::warn!("failed writing {}: {}", path.display(), e);
            return false;
        }

        state.dirty = false;
        state.last_write_seconds = now_seconds();

        tracing::info!("wrote {} entries to {}", state.data.len(), path.display());
        true
    }
}

impl Default for KvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for KvStore {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.dirty {
            tracing::debug!(
                "dropping dirty store, unsaved changes for {} discarded",
                state.default_path.display()
            );
        }
    }
}

fn now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
