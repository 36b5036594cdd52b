//! Stopwatch
//!
//! A small named timer for measuring store operations from the outside.
//! The store itself never uses it.

use std::fmt;
use std::time::{Duration, Instant};

/// Start/stop timer; `elapsed` is the span between the last start and stop
#[derive(Debug, Clone)]
pub struct Stopwatch {
    name: String,
    started: Option<Instant>,
    stopped: Option<Instant>,
}

impl Stopwatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: None,
            stopped: None,
        }
    }

    /// Create and start in one step
    pub fn started(name: impl Into<String>) -> Self {
        let mut timer = Self::new(name);
        timer.start();
        timer
    }

    /// Start or restart
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.stopped = None;
    }

    pub fn stop(&mut self) {
        self.stopped = Some(Instant::now());
    }

    /// Zero if never started; time so far if still running
    pub fn elapsed(&self) -> Duration {
        match (self.started, self.stopped) {
            (Some(t0), Some(t1)) => t1.saturating_duration_since(t0),
            (Some(t0), None) => t0.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// e.g. "read data: 1.25 milliseconds"
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Stopwatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.elapsed().as_nanos() as f64;
        if nanos > 1e9 {
            write!(f, "{}: {:.3} seconds", self.name, nanos / 1e9)
        } else if nanos > 1e6 {
            write!(f, "{}: {:.3} milliseconds", self.name, nanos / 1e6)
        } else {
            write!(f, "{}: {:.3} microseconds", self.name, nanos / 1e3)
        }
    }
}
