//! Error types for portkv
//!
//! Failures split into two disjoint tiers:
//!
//! - [`PortError`]: ordinary fallible operations (engine I/O, WAL
//!   serialization, client-side reply decoding). Propagated with `?`.
//! - [`FatalError`]: protocol or engine integrity violations that end the
//!   worker process. Each maps to a distinct [`ExitStatus`] that the
//!   supervisor interprets as the authoritative outcome signal. Only the
//!   worker loop boundary converts these into an actual exit.

use thiserror::Error;

/// Result type alias using PortError
pub type Result<T> = std::result::Result<T, PortError>;

/// Unified error type for portkv operations
#[derive(Debug, Error)]
pub enum PortError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Protocol Errors (client-side decode)
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Process exit statuses, one per fatal condition.
///
/// The supervisor restarts the worker on anything other than `Ok`; the code
/// tells it which contract was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitStatus {
    /// Clean shutdown after a successful close command
    Ok = 0,

    /// Short buffer, unknown opcode, or oversized frame
    BadCommand = 1,

    /// Bytes left over after a handler consumed its arguments
    TrailingData = 2,

    /// Engine reported a close failure
    CloseFail = 3,

    /// Engine reported a flush failure
    FlushFail = 4,

    /// Key argument could not be decoded
    BadUserKey = 5,

    /// Value argument could not be decoded
    BadUserValue = 6,

    /// Engine reported a put failure
    BadPut = 7,

    /// Reading or writing the command channel failed
    ChannelIo = 8,
}

impl ExitStatus {
    /// Numeric code handed to `process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// A condition that terminates the worker process.
///
/// Handlers and the codec return these instead of exiting; the worker loop
/// performs the exit exactly once, at the boundary.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("short or unknown command")]
    BadCommand,

    #[error("trailing bytes after command arguments")]
    TrailingData,

    #[error("index close failed: {0}")]
    CloseFail(PortError),

    #[error("index flush failed: {0}")]
    FlushFail(PortError),

    #[error("malformed user key")]
    BadUserKey,

    #[error("malformed user value")]
    BadUserValue,

    #[error("index put failed: {0}")]
    BadPut(PortError),

    #[error("command channel IO failed: {0}")]
    ChannelIo(#[from] std::io::Error),
}

impl FatalError {
    /// The exit status the worker reports for this condition
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            FatalError::BadCommand => ExitStatus::BadCommand,
            FatalError::TrailingData => ExitStatus::TrailingData,
            FatalError::CloseFail(_) => ExitStatus::CloseFail,
            FatalError::FlushFail(_) => ExitStatus::FlushFail,
            FatalError::BadUserKey => ExitStatus::BadUserKey,
            FatalError::BadUserValue => ExitStatus::BadUserValue,
            FatalError::BadPut(_) => ExitStatus::BadPut,
            FatalError::ChannelIo(_) => ExitStatus::ChannelIo,
        }
    }
}
