//! Keys Module
//!
//! Fixed-width, base62-encoded identifiers used to mint store keys.
//!
//! ## Key Shapes
//! ```text
//! TimestampKey (12 chars)
//! ┌──────────────────────────────┬───────────────┐
//! │ base62(micros since epoch) 9 │ base62(rand) 3│
//! └──────────────────────────────┴───────────────┘
//!
//! RouteKey (16 chars)
//! ┌──────────┬───────────────────────────────────┐
//! │ route (4)│        TimestampKey (12)          │
//! └──────────┴───────────────────────────────────┘
//! ```
//!
//! The timestamp part is only 9 characters wide while the clock stays inside
//! `[62^8, 62^9)` microseconds (roughly 1976 to 2398). Outside that window key
//! creation fails with `KeyFormat` rather than producing a short or long key.

pub mod base62;
mod generator;
mod types;

pub use generator::{
    create_random_key, create_route_key, create_timestamp_key, now_microseconds, random_int,
    Clock, KeyGenerator, SystemClock,
};
pub use types::{RouteKey, TimestampKey, ROUTE_SIZE, RTKEY_SIZE, TXKEY_SIZE};

/// Smallest integer whose base62 encoding is 3 characters ("100")
pub const BASE62_MIN: u64 = 3_844;

/// Largest integer whose base62 encoding is 3 characters ("zzz")
pub const BASE62_MAX: u64 = 238_327;

/// Default length of `create_random_key`
pub const DEFAULT_RANDOM_KEY_SIZE: usize = 16;
