//! Worker loop
//!
//! The single-threaded request/reply loop: read one framed command, dispatch
//! it, write the reply, repeat. One command is fully processed before the
//! next is read; there are no in-flight commands and nothing to lock.
//!
//! The loop never calls `process::exit` itself. It returns an [`ExitStatus`]
//! and the worker binary performs the exit once, at the boundary, so the
//! loop stays testable over in-memory channels.

use std::io::{Read, Write};

use crate::dispatch::{dispatch, Outcome};
use crate::engine::Index;
use crate::error::{ExitStatus, FatalError};
use crate::protocol::{read_frame, write_reply};

/// Serves the command channel for one index
pub struct Worker<R, W, I> {
    reader: R,
    writer: W,
    index: I,
}

impl<R: Read, W: Write, I: Index> Worker<R, W, I> {
    pub fn new(reader: R, writer: W, index: I) -> Self {
        Self {
            reader,
            writer,
            index,
        }
    }

    /// Serve commands until the session ends.
    ///
    /// Ends on a successful close command (clean status), on channel EOF
    /// (the controller vanished; the index is closed and the clean status
    /// returned), or on the first fatal condition.
    pub fn run(&mut self) -> ExitStatus {
        loop {
            let buf = match read_frame(&mut self.reader) {
                Ok(Some(buf)) => buf,
                Ok(None) => return self.close_on_eof(),
                Err(fatal) => return self.fail(fatal),
            };

            tracing::trace!(len = buf.len(), "command frame received");

            match dispatch(&mut self.index, &buf) {
                Outcome::Reply(reply) => {
                    if let Err(e) = write_reply(&mut self.writer, &reply) {
                        return self.fail(FatalError::ChannelIo(e));
                    }
                }
                Outcome::Shutdown(reply) => {
                    // Close replies before the process goes away
                    if let Err(e) = write_reply(&mut self.writer, &reply) {
                        return self.fail(FatalError::ChannelIo(e));
                    }
                    tracing::debug!("session closed by command");
                    return ExitStatus::Ok;
                }
                Outcome::Fatal(fatal) => return self.fail(fatal),
            }
        }
    }

    /// The controller hung up without sending close
    fn close_on_eof(&mut self) -> ExitStatus {
        tracing::warn!("command channel closed without a close command");
        match self.index.close() {
            Ok(()) => ExitStatus::Ok,
            Err(e) => self.fail(FatalError::CloseFail(e)),
        }
    }

    fn fail(&self, fatal: FatalError) -> ExitStatus {
        let status = fatal.exit_status();
        tracing::error!(error = %fatal, code = status.code(), "fatal session failure");
        status
    }
}
