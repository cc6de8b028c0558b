//! Engine Module
//!
//! The index engine behind the dispatcher.
//!
//! The dispatcher never sees a concrete store; it consumes exactly the five
//! abstract operations of the [`Index`] trait. Any storage engine can be
//! substituted behind that interface without touching the dispatch logic.
//!
//! [`Engine`] is the shipped implementation: a `BTreeMap` index made durable
//! by a checksummed write-ahead log that is replayed on open.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::wal::{self, Operation, WalWriter};

/// The engine operations the dispatcher consumes.
///
/// ## Contract
/// - `close` and `flush` fail only on integrity problems; the dispatcher
///   treats those failures as fatal.
/// - `get` is a pure lookup and cannot fail; absence is `None`.
/// - `delete` reports whether the key was present. An engine-level failure
///   while logging the removal also surfaces as `Err`; the dispatcher
///   collapses that into the recoverable "not deleted" reply.
pub trait Index {
    /// Close the index, making all state durable
    fn close(&mut self) -> Result<()>;

    /// Make pending writes durable without closing
    fn flush(&mut self) -> Result<()>;

    /// Store a key/value pair, overwriting any existing value
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Look up a value by key
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Remove a key; `Ok(false)` if it was not present
    fn delete(&mut self, key: &[u8]) -> Result<bool>;
}

/// WAL-backed in-memory index
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The live index; rebuilt from the WAL on open
    map: BTreeMap<Vec<u8>, Vec<u8>>,

    /// Operation log for durability
    wal: WalWriter,

    /// Set once close succeeds; later mutations are programming errors
    closed: bool,
}

impl Engine {
    const WAL_FILENAME: &'static str = "wal.log";

    /// Open or create an engine with the given config.
    ///
    /// On startup:
    /// 1. Create the data directory if needed
    /// 2. Replay the WAL, dropping any corrupt tail
    /// 3. Rebuild the in-memory index from the replayed operations
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let wal_path = config.data_dir.join(Self::WAL_FILENAME);
        let (operations, valid_len, stats) = wal::replay(&wal_path)?;

        if stats.truncated_bytes > 0 {
            tracing::warn!(
                bytes = stats.truncated_bytes,
                "dropping corrupt WAL tail"
            );
        }

        let mut map = BTreeMap::new();
        for operation in operations {
            match operation {
                Operation::Put { key, value } => {
                    map.insert(key, value);
                }
                Operation::Delete { key } => {
                    map.remove(&key);
                }
            }
        }

        tracing::debug!(
            records = stats.records,
            entries = map.len(),
            "index opened"
        );

        let wal = WalWriter::open(&wal_path, config.wal_sync_strategy, valid_len)?;

        Ok(Self {
            config,
            map,
            wal,
            closed: false,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses the default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Number of live entries in the index
    pub fn entry_count(&self) -> usize {
        self.map.len()
    }

    /// Whether a close has completed
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Index for Engine {
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.wal.sync()?;
        self.closed = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.wal.sync()
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        // WAL first: the map is only updated once the mutation is logged
        self.wal.append(&Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        self.map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.map.get(key).cloned()
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        if !self.map.contains_key(key) {
            return Ok(false);
        }
        self.wal.append(&Operation::Delete { key: key.to_vec() })?;
        self.map.remove(key);
        Ok(true)
    }
}
