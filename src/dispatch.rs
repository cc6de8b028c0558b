//! Command dispatcher
//!
//! Routes one decoded command to its engine operation and produces the
//! outcome the worker loop acts on. No state persists across calls except
//! the index handle, which the caller owns.
//!
//! The original escalation discipline applies: argument malformation and
//! engine failures on close/flush/put are fatal, because they indicate
//! either a desynced client or a corrupted store. Only the "not found"
//! outcomes on get and delete are reported back as recoverable ERROR
//! replies.

use crate::engine::Index;
use crate::error::FatalError;
use crate::protocol::{decode_command, Command, Reply};

/// The terminal action for one dispatched command
#[derive(Debug)]
pub enum Outcome {
    /// Write the reply, then read the next command
    Reply(Reply),

    /// Write the reply, then terminate with the clean-shutdown status
    Shutdown(Reply),

    /// Terminate with the condition's exit status; no reply is written
    Fatal(FatalError),
}

/// Process one command buffer against the index.
///
/// The buffer is borrowed for exactly this call; key and value arguments
/// are views into it and the engine is invoked before the call returns.
pub fn dispatch<I: Index>(index: &mut I, buf: &[u8]) -> Outcome {
    let command = match decode_command(buf) {
        Ok(command) => command,
        Err(fatal) => return Outcome::Fatal(fatal),
    };

    match command {
        Command::Close => match index.close() {
            Ok(()) => Outcome::Shutdown(Reply::ok_empty()),
            Err(e) => Outcome::Fatal(FatalError::CloseFail(e)),
        },

        Command::Flush => match index.flush() {
            Ok(()) => Outcome::Reply(Reply::ok_empty()),
            Err(e) => Outcome::Fatal(FatalError::FlushFail(e)),
        },

        Command::Put { key, value } => match index.put(key, value) {
            Ok(()) => Outcome::Reply(Reply::ok_empty()),
            Err(e) => Outcome::Fatal(FatalError::BadPut(e)),
        },

        Command::Get { key } => match index.get(key) {
            Some(value) => Outcome::Reply(Reply::ok(Some(value))),
            None => Outcome::Reply(Reply::error_empty()),
        },

        Command::Delete { key } => match index.delete(key) {
            Ok(true) => Outcome::Reply(Reply::ok_empty()),
            Ok(false) => Outcome::Reply(Reply::error_empty()),
            Err(e) => {
                // The delete contract has no fatal lane; report "not deleted"
                tracing::warn!(error = %e, "delete failed at the engine");
                Outcome::Reply(Reply::error_empty())
            }
        },
    }
}
