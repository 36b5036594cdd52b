//! Line codec
//!
//! Encoding and decoding for the flat-file format.
//!
//! ## File Format
//! ```text
//! key1=value1\n
//! key2=value=with=equals\n
//! ...
//! ```
//!
//! - One entry per line, split on the FIRST `=`
//! - No header, footer, checksum or escaping
//! - A key containing `=` is cut at the first `=` on read
//! - A value containing a newline cannot be represented
//! - Lines without `=` are skipped; a trailing `\r` is dropped
//! - Bytes that are not UTF-8 are replaced with U+FFFD, the rest of the line is kept

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{QuickKvError, Result};

/// Separator between key and value
pub const SEPARATOR: char = '=';

// =============================================================================
// Line Encoding/Decoding
// =============================================================================

/// Split one line into key and value; `None` if there is no separator
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.split_once(SEPARATOR)
}

/// Format one entry, including the trailing newline
pub fn format_line(key: &str, value: &str) -> String {
    let mut line = String::with_capacity(key.len() + value.len() + 2);
    line.push_str(key);
    line.push(SEPARATOR);
    line.push_str(value);
    line.push('\n');
    line
}

// =============================================================================
// Bulk Read/Write
// =============================================================================

/// Decode every well-formed line into `map` (upsert). Returns lines applied.
pub fn read_entries<R: BufRead>(reader: R, map: &mut BTreeMap<String, String>) -> Result<usize> {
    let mut applied = 0;
    let mut skipped = 0;
    let mut lossy = 0;

    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        if let Cow::Owned(_) = line {
            lossy += 1;
        }

        match parse_line(&line) {
            Some((key, value)) => {
                map.insert(key.to_string(), value.to_string());
                applied += 1;
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("skipped {} malformed lines", skipped);
    }
    if lossy > 0 {
        tracing::debug!("{} lines contained bytes that are not UTF-8", lossy);
    }

    Ok(applied)
}

/// Encode every entry in ascending key order
pub fn write_entries<W: Write>(writer: &mut W, map: &BTreeMap<String, String>) -> Result<()> {
    for (key, value) in map {
        writer.write_all(format_line(key, value).as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Append a single entry to `path`, creating the file if needed
pub fn append_line(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            tracing::error!("can't open file for append: {}", path.display());
            QuickKvError::file(path, e)
        })?;

    file.write_all(format_line(key, value).as_bytes())?;
    tracing::debug!("appended key/value: {}={}", key, value);

    Ok(())
}
