//! Write-ahead log
//!
//! Append-only operation log backing the in-memory index. Each record is:
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │     bincode(Operation)      │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! The CRC32 covers the serialized payload. Replay stops at the first
//! unreadable record (partial write or checksum mismatch); the writer then
//! truncates the file to the last good offset before appending, so a crash
//! mid-record never poisons subsequent appends.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::config::WalSyncStrategy;
use crate::error::{PortError, Result};

/// Record header: 4-byte length + 4-byte CRC32
pub const RECORD_HEADER_SIZE: usize = 8;

/// Upper bound on a single serialized record; anything larger is corruption
const MAX_RECORD_SIZE: u32 = 64 * 1024 * 1024;

/// A logged index mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Outcome of a replay pass
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayStats {
    /// Records successfully decoded
    pub records: usize,

    /// Bytes dropped from a corrupt or partially written tail
    pub truncated_bytes: u64,
}

/// Replay a log file, returning the decoded operations, the offset of the
/// last good record, and replay statistics.
///
/// A missing file is an empty log, not an error.
pub fn replay(path: &Path) -> Result<(Vec<Operation>, u64, ReplayStats)> {
    if !path.exists() {
        return Ok((Vec::new(), 0, ReplayStats::default()));
    }

    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let mut operations = Vec::new();
    let mut valid_len: u64 = 0;
    let mut stats = ReplayStats::default();

    loop {
        match read_record(&mut reader) {
            Ok(Some((operation, record_len))) => {
                operations.push(operation);
                valid_len += record_len;
                stats.records += 1;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, offset = valid_len, "WAL replay stopped early");
                break;
            }
        }
    }

    stats.truncated_bytes = file_len - valid_len;
    Ok((operations, valid_len, stats))
}

/// Read one record; `Ok(None)` at clean EOF, `Err` on a corrupt tail
fn read_record<R: Read>(reader: &mut R) -> Result<Option<(Operation, u64)>> {
    let mut header = [0u8; RECORD_HEADER_SIZE];
    match reader.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let crc = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    if len > MAX_RECORD_SIZE {
        return Err(PortError::WalCorruption(format!(
            "record length {} exceeds maximum",
            len
        )));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;

    if crc32fast::hash(&payload) != crc {
        return Err(PortError::WalCorruption("record checksum mismatch".to_string()));
    }

    let operation = bincode::deserialize(&payload)
        .map_err(|e| PortError::Serialization(e.to_string()))?;

    Ok(Some((operation, (RECORD_HEADER_SIZE + payload.len()) as u64)))
}

/// Appending writer over the log file
pub struct WalWriter {
    file: BufWriter<File>,
    strategy: WalSyncStrategy,
    pending: usize,
}

impl WalWriter {
    /// Open the log for appending.
    ///
    /// `valid_len` is the offset returned by [`replay`]; anything past it is
    /// discarded before the first append.
    pub fn open(path: &Path, strategy: WalSyncStrategy, valid_len: u64) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        if file.metadata()?.len() > valid_len {
            file.set_len(valid_len)?;
        }
        file.seek(SeekFrom::End(0))?;

        Ok(Self {
            file: BufWriter::new(file),
            strategy,
            pending: 0,
        })
    }

    /// Append one operation, syncing per the configured strategy
    pub fn append(&mut self, operation: &Operation) -> Result<()> {
        let payload = bincode::serialize(operation)
            .map_err(|e| PortError::Serialization(e.to_string()))?;

        let mut header = BytesMut::with_capacity(RECORD_HEADER_SIZE);
        header.put_u32(payload.len() as u32);
        header.put_u32(crc32fast::hash(&payload));

        self.file.write_all(&header)?;
        self.file.write_all(&payload)?;
        self.pending += 1;

        match self.strategy {
            WalSyncStrategy::EveryWrite => self.sync()?,
            WalSyncStrategy::EveryNEntries { count } if self.pending >= count => self.sync()?,
            WalSyncStrategy::EveryNEntries { .. } => {}
        }

        Ok(())
    }

    /// Flush buffered records and fsync the file
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        self.pending = 0;
        Ok(())
    }
}
