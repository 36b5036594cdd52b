//! Store Module
//!
//! The concurrent key-value store and its flat-file persistence.
//!
//! ## Responsibilities
//! - Ordered string-to-string map guarded by one lock per store
//! - Snapshot queries (keys, search, last, random)
//! - Dirty tracking and last-write time
//! - Line-oriented read/write/append (see `codec`)
//!
//! ## Data Structure Choice
//! BTreeMap behind a `parking_lot::Mutex`:
//! - Iteration is ascending key order, which `last` and `write` rely on
//! - Coarse lock keeps every call atomic, I/O included

pub mod codec;
mod catalog;
mod kv;

pub use catalog::StoreCatalog;
pub use kv::KvStore;
