//! Key Generator
//!
//! Mints timestamp, route and random keys.
//!
//! ## Random Source
//! `KeyGenerator` owns its own `StdRng` behind a mutex, so a store or service
//! can hold one explicitly (and seed it in tests). The free functions at the
//! bottom of this module use the per-thread generator instead.
//!
//! ## Timestamp Issue
//! The timestamp half of a key never repeats for a given source: if the clock
//! has not advanced (or moved backward) since the last key, the previous value
//! plus one microsecond is used. Bursts of keys therefore stay distinct even
//! when the random suffix collides.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{base62, RouteKey, TimestampKey, BASE62_MAX, BASE62_MIN, ROUTE_SIZE};
use crate::error::{QuickKvError, Result};

// =============================================================================
// Clock
// =============================================================================

/// Source of wall-clock time in microseconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now_microseconds(&self) -> u64;
}

/// The system wall clock (not monotonic)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_microseconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}

// =============================================================================
// KeyGenerator
// =============================================================================

struct GeneratorState {
    rng: StdRng,
    last_micros: u64,
}

/// An explicit, seedable key source
pub struct KeyGenerator {
    state: Mutex<GeneratorState>,
    clock: Arc<dyn Clock>,
}

impl KeyGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a deterministic generator (random parts only; time still comes from the clock)
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(GeneratorState {
                rng,
                last_micros: 0,
            }),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now_microseconds(&self) -> u64 {
        self.clock.now_microseconds()
    }

    /// Uniform integer in `[min, max]` (bounds are swapped if reversed)
    pub fn random_int(&self, min: u64, max: u64) -> u64 {
        draw_int(&mut self.state.lock().rng, min, max)
    }

    pub fn create_timestamp_key(&self) -> Result<TimestampKey> {
        let now = self.clock.now_microseconds();
        let mut state = self.state.lock();
        let micros = next_micros(state.last_micros, now);
        let key = timestamp_key_at(micros, &mut state.rng)?;
        state.last_micros = micros;
        Ok(key)
    }

    /// Route keys pad `route` to 4 characters with random symbols; longer routes are rejected
    pub fn create_route_key(&self, route: &str) -> Result<RouteKey> {
        let now = self.clock.now_microseconds();
        let mut state = self.state.lock();
        let micros = next_micros(state.last_micros, now);
        let key = route_key_at(route, micros, &mut state.rng)?;
        state.last_micros = micros;
        Ok(key)
    }

    pub fn create_random_key(&self, size: usize) -> String {
        random_key(size, &mut self.state.lock().rng)
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Process-level convenience functions
// =============================================================================

static LAST_ISSUED_MICROS: AtomicU64 = AtomicU64::new(0);

fn issue_micros() -> u64 {
    let now = SystemClock.now_microseconds();
    let prev = LAST_ISSUED_MICROS
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(next_micros(last, now))
        })
        .unwrap_or(now);
    next_micros(prev, now)
}

/// Wall-clock microseconds since the Unix epoch
pub fn now_microseconds() -> u64 {
    SystemClock.now_microseconds()
}

/// Uniform integer in `[min, max]` from the per-thread generator
pub fn random_int(min: u64, max: u64) -> u64 {
    draw_int(&mut rand::thread_rng(), min, max)
}

/// Create a 12-character timestamp key
pub fn create_timestamp_key() -> Result<TimestampKey> {
    timestamp_key_at(issue_micros(), &mut rand::thread_rng())
}

/// Create a 16-character route key; pass "" for a fully random route
pub fn create_route_key(route: &str) -> Result<RouteKey> {
    check_route(route)?;
    route_key_at(route, issue_micros(), &mut rand::thread_rng())
}

/// Create a random base62 key of `size` characters
pub fn create_random_key(size: usize) -> String {
    random_key(size, &mut rand::thread_rng())
}

// =============================================================================
// Shared helpers
// =============================================================================

fn next_micros(last: u64, now: u64) -> u64 {
    if now > last {
        now
    } else {
        last.saturating_add(1)
    }
}

fn draw_int<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(lo..=hi)
}

fn random_symbol<R: Rng + ?Sized>(rng: &mut R) -> char {
    base62::symbol(rng.gen_range(0..base62::ALPHABET.len()))
}

fn check_route(route: &str) -> Result<usize> {
    let len = route.chars().count();
    if len > ROUTE_SIZE {
        return Err(QuickKvError::KeyFormat {
            kind: "route",
            expected: ROUTE_SIZE,
            actual: len,
        });
    }
    Ok(len)
}

fn timestamp_key_at<R: Rng + ?Sized>(micros: u64, rng: &mut R) -> Result<TimestampKey> {
    let mut s = base62::encode(micros);
    s.push_str(&base62::encode(draw_int(rng, BASE62_MIN, BASE62_MAX)));

    TimestampKey::new(s).map_err(|e| {
        tracing::error!(micros, "timestamp outside the 12-char key window: {}", e);
        e
    })
}

fn route_key_at<R: Rng + ?Sized>(route: &str, micros: u64, rng: &mut R) -> Result<RouteKey> {
    let mut len = check_route(route)?;
    let mut rt = String::with_capacity(ROUTE_SIZE + super::TXKEY_SIZE);
    rt.push_str(route);
    while len < ROUTE_SIZE {
        rt.push(random_symbol(rng));
        len += 1;
    }

    let tx = timestamp_key_at(micros, rng)?;
    rt.push_str(tx.as_str());
    RouteKey::new(rt)
}

fn random_key<R: Rng + ?Sized>(size: usize, rng: &mut R) -> String {
    (0..size).map(|_| random_symbol(rng)).collect()
}
