//! Engine Tests
//!
//! WAL-backed engine behaviour: basic operations, replay on reopen, and
//! corrupt-tail recovery.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

use portkv::config::WalSyncStrategy;
use portkv::engine::Index;
use portkv::{Config, Engine};

fn open_engine(dir: &Path) -> Engine {
    let config = Config::builder()
        .data_dir(dir)
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .build();
    Engine::open(config).unwrap()
}

#[test]
fn put_get_delete_basics() {
    let dir = TempDir::new().unwrap();
    let mut engine = open_engine(dir.path());

    assert_eq!(engine.get(b"key"), None);

    engine.put(b"key", b"value").unwrap();
    assert_eq!(engine.get(b"key"), Some(b"value".to_vec()));
    assert_eq!(engine.entry_count(), 1);

    // Overwrite keeps a single entry
    engine.put(b"key", b"value2").unwrap();
    assert_eq!(engine.get(b"key"), Some(b"value2".to_vec()));
    assert_eq!(engine.entry_count(), 1);

    assert!(engine.delete(b"key").unwrap());
    assert_eq!(engine.get(b"key"), None);
    assert_eq!(engine.entry_count(), 0);
}

#[test]
fn delete_absent_key_reports_false_without_logging() {
    let dir = TempDir::new().unwrap();
    let mut engine = open_engine(dir.path());

    assert!(!engine.delete(b"never-stored").unwrap());

    // Nothing was logged, so a reopen sees an empty index
    drop(engine);
    let engine = open_engine(dir.path());
    assert_eq!(engine.entry_count(), 0);
}

#[test]
fn reopen_replays_wal() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = open_engine(dir.path());
        engine.put(b"a", b"1").unwrap();
        engine.put(b"b", b"2").unwrap();
        engine.delete(b"a").unwrap();
        engine.close().unwrap();
    }

    let engine = open_engine(dir.path());
    assert_eq!(engine.get(b"a"), None);
    assert_eq!(engine.get(b"b"), Some(b"2".to_vec()));
    assert_eq!(engine.entry_count(), 1);
}

#[test]
fn flush_makes_buffered_writes_durable() {
    let dir = TempDir::new().unwrap();

    {
        // Large sync interval so nothing syncs implicitly
        let config = Config::builder()
            .data_dir(dir.path())
            .wal_sync_strategy(WalSyncStrategy::EveryNEntries { count: 1000 })
            .build();
        let mut engine = Engine::open(config).unwrap();
        engine.put(b"key", b"value").unwrap();
        engine.flush().unwrap();
    }

    let engine = open_engine(dir.path());
    assert_eq!(engine.get(b"key"), Some(b"value".to_vec()));
}

#[test]
fn corrupt_tail_is_truncated_and_log_stays_appendable() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = open_engine(dir.path());
        engine.put(b"good", b"record").unwrap();
        engine.close().unwrap();
    }

    // Simulate a crash mid-append: a partial record at the tail
    let wal_path = dir.path().join("wal.log");
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0x00, 0x00, 0x00, 0x50, 0xDE, 0xAD]).unwrap();
    drop(file);

    {
        let mut engine = open_engine(dir.path());
        assert_eq!(engine.get(b"good"), Some(b"record".to_vec()));

        // Appending after truncation must produce a clean log
        engine.put(b"after", b"crash").unwrap();
        engine.close().unwrap();
    }

    let engine = open_engine(dir.path());
    assert_eq!(engine.get(b"good"), Some(b"record".to_vec()));
    assert_eq!(engine.get(b"after"), Some(b"crash".to_vec()));
}

#[test]
fn checksum_mismatch_drops_the_damaged_tail() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = open_engine(dir.path());
        engine.put(b"first", b"1").unwrap();
        engine.put(b"second", b"2").unwrap();
        engine.close().unwrap();
    }

    // Flip a byte in the last record's payload
    let wal_path = dir.path().join("wal.log");
    let mut contents = std::fs::read(&wal_path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0xFF;
    std::fs::write(&wal_path, &contents).unwrap();

    let engine = open_engine(dir.path());
    assert_eq!(engine.get(b"first"), Some(b"1".to_vec()));
    assert_eq!(engine.get(b"second"), None);
}

#[test]
fn close_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut engine = open_engine(dir.path());

    engine.put(b"key", b"value").unwrap();
    engine.close().unwrap();
    assert!(engine.is_closed());
    engine.close().unwrap();
}
