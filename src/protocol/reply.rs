//! Reply definitions
//!
//! Represents replies to the controlling client. Exactly one reply is written
//! per processed command; fatal conditions skip the reply and surface through
//! the process exit status instead.

/// Reply status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0,
    Error = 1,
}

/// A reply to send to the controlling client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Status code
    pub status: Status,

    /// Optional payload (the value for a GET hit; empty otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Reply {
    /// Create an OK reply with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an OK reply with no payload (lifecycle commands, put, delete hit)
    pub fn ok_empty() -> Self {
        Self {
            status: Status::Ok,
            payload: None,
        }
    }

    /// Create an ERROR reply with no payload ("not found" on get/delete)
    pub fn error_empty() -> Self {
        Self {
            status: Status::Error,
            payload: None,
        }
    }

    /// Whether this reply carries the OK status
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}
