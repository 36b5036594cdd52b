//! Tests for KvStore
//!
//! These tests verify:
//! - set/get/remove semantics and return values
//! - Snapshot queries (keys, search, last, random)
//! - Flat-file read/write/append
//! - Dirty tracking and last-write time
//! - Concurrent access patterns

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use quickkv::{Config, KvStore, QuickKvError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const RAW_TEMPS_DATA: &str = "1740422400.cottage.0=15.343750\n\
1740422700.cottage.0=15.458330\n\
1740423000.cottage.0=15.651040\n\
1740423300.cottage.0=15.739580\n\
1740423600.cottage.0=16.010420\n\
1740423900.cottage.0=16.192711\n\
1740424200.cottage.0=16.244789\n\
1740424500.cottage.0=16.062500\n\
1740424800.cottage.0=16.041670\n\
1740425100.cottage.0=15.833330\n\
1740425400.cottage.0=15.812500\n\
1740425700.cottage.0=16.234381";

fn populate(store: &KvStore, size: usize) {
    for i in 0..size {
        store.set(format!("key{:04}", i), format!("value{}", i));
    }
}

fn setup_temp_store() -> (TempDir, KvStore) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .default_path(temp_dir.path().join("store.db"))
        .build();
    (temp_dir, KvStore::with_config(config))
}

fn write_raw(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = KvStore::new();
    assert_eq!(store.size(), 0);
    assert!(store.is_empty());
    assert!(!store.is_dirty());
    assert_eq!(store.last_write_seconds(), 0);
}

#[test]
fn test_set_and_get() {
    let store = KvStore::new();

    assert!(store.set("key1", "value1"));

    assert_eq!(store.get("key1"), Some("value1".to_string()));
    assert!(store.contains("key1"));
    assert_eq!(store.size(), 1);
}

#[test]
fn test_set_existing_key_returns_false() {
    let store = KvStore::new();

    assert!(store.set("k", "v1"));
    assert!(!store.set("k", "v2"));

    assert_eq!(store.get("k"), Some("v2".to_string()));
    assert_eq!(store.size(), 1);
}

#[test]
fn test_get_nonexistent_key() {
    let store = KvStore::new();
    populate(&store, 5);

    assert_eq!(store.get("not-a-good-key"), None);
}

#[test]
fn test_remove() {
    let store = KvStore::new();
    populate(&store, 5);

    let key = store.keys()[0].clone();
    assert!(store.remove(&key));
    assert_eq!(store.get(&key), None);
    assert_eq!(store.size(), 4);

    assert!(!store.remove(&key));
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_keys_are_sorted() {
    let store = KvStore::new();
    store.set("cherry", "3");
    store.set("apple", "1");
    store.set("banana", "2");

    assert_eq!(store.keys(), vec!["apple", "banana", "cherry"]);
}

#[test]
fn test_keys_where_filters_keys() {
    let store = KvStore::new();
    store.set("user:1", "alice");
    store.set("user:2", "bob");
    store.set("post:1", "hello");

    let users = store.keys_where(|k| k.starts_with("user:"));
    assert_eq!(users, vec!["user:1", "user:2"]);
}

#[test]
fn test_keys_returns_snapshot() {
    let store = KvStore::new();
    populate(&store, 3);

    let keys = store.keys();
    store.set("zzz", "late");

    assert_eq!(keys.len(), 3);
    assert_eq!(store.size(), 4);
}

#[test]
fn test_search_filters_on_value() {
    let store = KvStore::new();
    store.set("a", "match");
    store.set("b", "other");
    store.set("match", "nope");

    let found = store.search(|v| v == "match");

    assert_eq!(found.len(), 1);
    assert_eq!(found.get("a").map(String::as_str), Some("match"));
}

#[test]
fn test_snapshot_copies_everything() {
    let store = KvStore::new();
    populate(&store, 10);

    let all = store.snapshot();
    assert_eq!(all.len(), 10);
    assert_eq!(all.get("key0003").map(String::as_str), Some("value3"));
}

#[test]
fn test_last_zero_is_empty() {
    let store = KvStore::new();
    populate(&store, 10);

    assert!(store.last(0).is_empty());
}

#[test]
fn test_last_on_empty_store() {
    let store = KvStore::new();
    assert!(store.last(5).is_empty());
}

#[test]
fn test_last_more_than_size_returns_all() {
    let store = KvStore::new();
    populate(&store, 3);

    let last = store.last(5);
    assert_eq!(last.len(), 3);
}

#[test]
fn test_last_returns_largest_keys() {
    let store = KvStore::new();
    populate(&store, 100);

    let last: Vec<String> = store.last(5).into_keys().collect();
    assert_eq!(
        last,
        vec!["key0095", "key0096", "key0097", "key0098", "key0099"]
    );
}

#[test]
fn test_last_default_count_of_one() {
    let store = KvStore::new();
    populate(&store, 10);

    let last = store.last(1);
    assert_eq!(last.get("key0009").map(String::as_str), Some("value9"));
}

#[test]
fn test_random_on_empty_store() {
    let store = KvStore::new();
    assert!(matches!(store.random(), Err(QuickKvError::EmptyStore)));
}

#[test]
fn test_random_returns_stored_entry() {
    let store = KvStore::new();
    populate(&store, 20);

    for _ in 0..50 {
        let (key, value) = store.random().unwrap();
        assert_eq!(store.get(&key), Some(value));
    }
}

#[test]
fn test_random_reaches_every_entry() {
    let store = KvStore::new();
    populate(&store, 3);

    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..500 {
        seen.insert(store.random().unwrap().0);
    }
    assert_eq!(seen.len(), 3);
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_temperature_data() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("temps.db");
    write_raw(&path, RAW_TEMPS_DATA);

    let store = KvStore::new();
    assert!(store.read(&path, false));
    assert_eq!(store.size(), 12);

    for key in store.keys() {
        let value: f32 = store.get(&key).unwrap().parse().unwrap();
        assert!(value > 15.0 && value < 17.0, "{} out of range", value);
    }
}

#[test]
fn test_read_missing_file_returns_false() {
    let temp_dir = TempDir::new().unwrap();
    let store = KvStore::new();
    store.set("keep", "me");

    assert!(!store.read(temp_dir.path().join("nope.db"), true));
    assert_eq!(store.get("keep"), Some("me".to_string()));
}

#[test]
fn test_read_splits_on_first_separator_and_skips_malformed() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mixed.db");
    write_raw(&path, "url=https://x.io/?a=1&b=2\nno separator\n\nk=v\n");

    let store = KvStore::new();
    assert!(store.read(&path, false));

    assert_eq!(store.size(), 2);
    assert_eq!(store.get("url"), Some("https://x.io/?a=1&b=2".to_string()));
    assert_eq!(store.get("k"), Some("v".to_string()));
}

#[test]
fn test_read_keeps_lines_with_invalid_utf8() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bytes.db");
    fs::write(&path, b"a=1\nb=2\nbad=\xff\xfe\nc=3\n").unwrap();

    let store = KvStore::new();
    assert!(store.read(&path, false));

    assert_eq!(store.size(), 4);
    assert_eq!(store.get("a"), Some("1".to_string()));
    assert_eq!(store.get("c"), Some("3".to_string()));
    assert_eq!(store.get("bad"), Some("\u{fffd}\u{fffd}".to_string()));
    assert!(!store.is_dirty());
}

#[test]
fn test_read_later_lines_win() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dupes.db");
    write_raw(&path, "k=first\nk=second\n");

    let store = KvStore::new();
    assert!(store.read(&path, false));
    assert_eq!(store.get("k"), Some("second".to_string()));
}

#[test]
fn test_read_merge_keeps_existing_entries() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("merge.db");
    write_raw(&path, "a=file\nb=file\n");

    let store = KvStore::new();
    store.set("a", "memory");
    store.set("c", "memory");

    assert!(store.read(&path, false));

    assert_eq!(store.size(), 3);
    assert_eq!(store.get("a"), Some("file".to_string()));
    assert_eq!(store.get("c"), Some("memory".to_string()));
}

#[test]
fn test_read_clear_replaces_entries() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("clear.db");
    write_raw(&path, "a=file\n");

    let store = KvStore::new();
    store.set("c", "memory");

    assert!(store.read(&path, true));

    assert_eq!(store.keys(), vec!["a"]);
}

#[test]
fn test_read_default_uses_configured_path_and_mode() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("default.db");
    write_raw(&path, "a=1\n");

    let config = Config::builder()
        .default_path(&path)
        .clear_on_read(true)
        .build();
    let store = KvStore::with_config(config);
    store.set("stale", "x");

    assert!(store.read_default());
    assert_eq!(store.keys(), vec!["a"]);
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_then_read_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("round.db");

    let store = KvStore::new();
    populate(&store, 20);
    assert!(store.write(&path));

    let restored = KvStore::new();
    assert!(restored.read(&path, false));

    assert_eq!(restored.size(), 20);
    assert_eq!(restored.snapshot(), store.snapshot());
}

#[test]
fn test_write_is_sorted_by_key() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sorted.db");

    let store = KvStore::new();
    store.set("b", "2");
    store.set("a", "1");
    store.set("c", "3");
    assert!(store.write(&path));

    assert_eq!(fs::read_to_string(&path).unwrap(), "a=1\nb=2\nc=3\n");
}

#[test]
fn test_write_truncates_previous_contents() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("trunc.db");
    write_raw(&path, "old=1\nolder=2\n");

    let store = KvStore::new();
    store.set("new", "3");
    assert!(store.write(&path));

    assert_eq!(fs::read_to_string(&path).unwrap(), "new=3\n");
}

#[test]
fn test_write_to_bad_path_returns_false() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing/dir/store.db");

    let store = KvStore::new();
    store.set("k", "v");

    assert!(!store.write(&path));
    assert!(store.is_dirty());
    assert_eq!(store.last_write_seconds(), 0);
}

#[test]
fn test_write_default() {
    let (temp_dir, store) = setup_temp_store();
    store.set("k", "v");

    assert!(store.write_default());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("store.db")).unwrap(),
        "k=v\n"
    );
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_does_not_touch_map() {
    let (temp_dir, store) = setup_temp_store();

    store.append("12345", "22.3344").unwrap();
    store.append("12346", "22.5").unwrap();

    assert_eq!(store.size(), 0);
    assert!(!store.is_dirty());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("store.db")).unwrap(),
        "12345=22.3344\n12346=22.5\n"
    );
}

#[test]
fn test_append_then_read_picks_up_lines() {
    let (_temp, store) = setup_temp_store();
    store.set("a", "1");
    assert!(store.write_default());

    store.append("b", "2").unwrap();
    assert!(store.read_default());

    assert_eq!(store.size(), 2);
    assert_eq!(store.get("b"), Some("2".to_string()));
}

#[test]
fn test_append_to_bad_path_is_file_error() {
    let store = KvStore::new();

    let result = store.append_to("bad-file/folder/temps/bad.db", "12345", "22.3344");

    match result {
        Err(QuickKvError::File { path, .. }) => {
            assert!(path.ends_with("bad.db"));
        }
        other => panic!("expected file error, got {:?}", other),
    }
}

// =============================================================================
// Dirty Tracking Tests
// =============================================================================

#[test]
fn test_dirty_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dirty.db");
    write_raw(&path, RAW_TEMPS_DATA);

    let store = KvStore::new();
    assert!(store.read(&path, false));
    assert!(!store.is_dirty());

    store.set("1740426000.cottage.0", "16.1");
    assert!(store.is_dirty());

    assert!(store.write(&path));
    assert!(!store.is_dirty());
    assert!(store.last_write_seconds() > 0);
}

#[test]
fn test_remove_missing_key_stays_clean() {
    let store = KvStore::new();
    assert!(!store.remove("ghost"));
    assert!(!store.is_dirty());
}

#[test]
fn test_merge_read_preserves_dirty_flag() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("merge.db");
    write_raw(&path, "a=1\n");

    let store = KvStore::new();
    store.set("x", "y");
    assert!(store.read(&path, false));
    assert!(store.is_dirty());
}

#[test]
fn test_clear_read_resets_dirty_flag() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("clear.db");
    write_raw(&path, "a=1\n");

    let store = KvStore::new();
    store.set("x", "y");
    assert!(store.read(&path, true));
    assert!(!store.is_dirty());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_default_path_accessors() {
    let store = KvStore::new();
    store.set_default_path("data/contact-list.db");
    assert_eq!(store.default_path(), Path::new("data/contact-list.db"));
}

#[test]
fn test_flush_clean_store_writes_nothing() {
    let (temp_dir, store) = setup_temp_store();

    assert!(store.flush());
    assert!(!temp_dir.path().join("store.db").exists());
}

#[test]
fn test_flush_dirty_store() {
    let (temp_dir, store) = setup_temp_store();
    store.set("k", "v");

    assert!(store.flush());
    assert!(!store.is_dirty());
    assert!(temp_dir.path().join("store.db").exists());
}

#[test]
fn test_close_persists() {
    let (temp_dir, store) = setup_temp_store();
    store.set("k", "v");

    assert!(store.close());

    let restored = KvStore::new();
    assert!(restored.read(temp_dir.path().join("store.db"), false));
    assert_eq!(restored.get("k"), Some("v".to_string()));
}

#[test]
fn test_drop_does_not_write() {
    let (temp_dir, store) = setup_temp_store();
    store.set("k", "v");

    drop(store);

    assert!(!temp_dir.path().join("store.db").exists());
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_writes() {
    let store = Arc::new(KvStore::new());

    let mut handles = vec![];
    for t in 0..8 {
        let store_clone = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..250 {
                let key = format!("thread{}_key{}", t, i);
                assert!(store_clone.set(key, format!("thread{}_value{}", t, i)));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.size(), 2000);
    assert_eq!(store.get("thread3_key42"), Some("thread3_value42".to_string()));
}

#[test]
fn test_concurrent_same_key_exactly_one_insert() {
    let store = Arc::new(KvStore::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store_clone = Arc::clone(&store);
            thread::spawn(move || store_clone.set("shared", format!("{}", t)))
        })
        .collect();

    let inserted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&inserted| inserted)
        .count();

    assert_eq!(inserted, 1);
    assert_eq!(store.size(), 1);
}

#[test]
fn test_concurrent_readers_and_writer() {
    let store = Arc::new(KvStore::new());
    populate(&store, 100);

    let writer = {
        let store_clone = Arc::clone(&store);
        thread::spawn(move || {
            for i in 100..300 {
                store_clone.set(format!("key{:04}", i), format!("value{}", i));
            }
        })
    };

    let mut readers = vec![];
    for _ in 0..4 {
        let store_clone = Arc::clone(&store);
        readers.push(thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key{:04}", i);
                assert_eq!(store_clone.get(&key), Some(format!("value{}", i)));

                // Every snapshot is internally consistent
                let keys = store_clone.keys();
                assert!(keys.windows(2).all(|w| w[0] < w[1]));
                assert!(keys.len() >= 100);
            }
        }));
    }

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.size(), 300);
}

#[test]
fn test_concurrent_write_and_mutate() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("busy.db");
    let store = Arc::new(KvStore::new());
    populate(&store, 50);

    let mutator = {
        let store_clone = Arc::clone(&store);
        thread::spawn(move || {
            for i in 50..150 {
                store_clone.set(format!("key{:04}", i), "v");
            }
        })
    };

    for _ in 0..10 {
        assert!(store.write(&path));
    }
    mutator.join().unwrap();
    assert!(store.write(&path));

    let restored = KvStore::new();
    assert!(restored.read(&path, false));
    assert_eq!(restored.size(), 150);
}

#[test]
fn test_independent_stores() {
    let users = KvStore::new();
    let posts = KvStore::new();

    users.set("1", "alice");
    posts.set("1", "hello world");

    assert_eq!(users.get("1"), Some("alice".to_string()));
    assert_eq!(posts.get("1"), Some("hello world".to_string()));
    assert!(users.is_dirty());

    users.remove("1");
    assert_eq!(posts.size(), 1);
}
