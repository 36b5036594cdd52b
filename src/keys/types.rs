//! Fixed-width key types
//!
//! Both types validate their width on construction and are immutable after.
//! Width is counted in characters, not bytes.

use std::fmt;
use std::str::FromStr;

use crate::error::{QuickKvError, Result};

/// Width of a `TimestampKey`
pub const TXKEY_SIZE: usize = 12;

/// Width of a `RouteKey`
pub const RTKEY_SIZE: usize = 16;

/// Width of the route segment at the front of a `RouteKey`
pub const ROUTE_SIZE: usize = RTKEY_SIZE - TXKEY_SIZE;

fn check_width(kind: &'static str, s: &str, expected: usize) -> Result<()> {
    let actual = s.chars().count();
    if actual != expected {
        return Err(QuickKvError::KeyFormat {
            kind,
            expected,
            actual,
        });
    }
    Ok(())
}

// =============================================================================
// TimestampKey
// =============================================================================

/// 12-character key: base62 microsecond timestamp + 3-character random suffix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampKey(String);

impl TimestampKey {
    /// Construct from a string of exactly 12 characters
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        check_width("timestamp key", &s, TXKEY_SIZE)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Always `TXKEY_SIZE`
    pub fn len(&self) -> usize {
        TXKEY_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// =============================================================================
// RouteKey
// =============================================================================

/// 16-character key: 4-character route segment + `TimestampKey`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey(String);

impl RouteKey {
    /// Construct from a string of exactly 16 characters
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        check_width("route key", &s, RTKEY_SIZE)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Always `RTKEY_SIZE`
    pub fn len(&self) -> usize {
        RTKEY_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The leading route segment
    pub fn route(&self) -> &str {
        &self.0[..self.split_at()]
    }

    /// The trailing timestamp key
    pub fn timestamp_key(&self) -> TimestampKey {
        TimestampKey(self.0[self.split_at()..].to_string())
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn split_at(&self) -> usize {
        // Width was checked in `new`, so the boundary always exists
        self.0
            .char_indices()
            .nth(ROUTE_SIZE)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len())
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! impl_key_conversions {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $ty {
            type Err = QuickKvError;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = QuickKvError;

            fn try_from(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = QuickKvError;

            fn try_from(s: String) -> Result<Self> {
                Self::new(s)
            }
        }

        impl From<$ty> for String {
            fn from(key: $ty) -> String {
                key.0
            }
        }
    };
}

impl_key_conversions!(TimestampKey);
impl_key_conversions!(RouteKey);
