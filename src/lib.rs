//! # QuickKV
//!
//! An embeddable key-value store with:
//! - An ordered string map guarded by one mutex per store
//! - Flat-file persistence, one `key=value` line per entry
//! - Dirty tracking and explicit (never implicit) writes
//! - Base62 timestamp, route and random key generation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller                                │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ mint keys                    │ set/get/query
//!                ▼                              ▼
//!   ┌────────────────────────┐       ┌────────────────────────┐
//!   │     KeyGenerator       │       │        KvStore         │
//!   │ (timestamp/route/rand) │       │  (Mutex<BTreeMap>)     │
//!   └───────────┬────────────┘       └───────────┬────────────┘
//!               │                                │
//!               ▼                                ▼
//!   ┌────────────────────────┐       ┌────────────────────────┐
//!   │        base62          │       │      line codec        │
//!   └────────────────────────┘       │   (key=value\n file)   │
//!                                    └────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use quickkv::{keys, KvStore};
//!
//! let store = KvStore::new();
//! let key = keys::create_route_key("user").unwrap();
//! store.set(key.as_str(), "alice");
//! assert!(store.write("users.db"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keys;
pub mod store;
pub mod timer;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{QuickKvError, Result};
pub use config::Config;
pub use keys::{KeyGenerator, RouteKey, TimestampKey};
pub use store::{KvStore, StoreCatalog};
pub use timer::Stopwatch;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of QuickKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
