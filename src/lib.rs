//! # portkv
//!
//! A supervised key/value index worker speaking a framed binary command
//! protocol over a byte-stream channel to a single controlling client.
//!
//! - Length-prefixed command frames, big-endian 32-bit opcodes
//! - Zero-copy cursor decoding of key/value arguments
//! - Strict exact-consumption framing (trailing bytes are fatal)
//! - Recoverable "not found" replies; everything else escalates to a
//!   distinct process exit status the supervisor interprets
//! - WAL-backed in-memory index with replay-on-open recovery
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Controlling Client                          │
//! │              (one command in flight, ever)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ framed commands / replies
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Worker Loop                               │
//! │        (read frame → dispatch → write reply)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Dispatcher                                │
//! │   (opcode switch, exact consumption, fatal/recoverable)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Index trait
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │   BTreeMap  │
//!   │  (Append)   │          │   (Index)   │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod wal;
pub mod engine;
pub mod dispatch;
pub mod worker;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use dispatch::{dispatch, Outcome};
pub use engine::{Engine, Index};
pub use error::{ExitStatus, FatalError, PortError, Result};
pub use worker::Worker;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of portkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
