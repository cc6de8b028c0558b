//! Command definitions
//!
//! Represents commands from the controlling client.

/// Operation selectors, sent as a 4-byte big-endian integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Opcode {
    Close = 0,
    Flush = 1,
    PutUserKv = 2,
    GetUserKv = 3,
    DelUserKv = 4,
}

impl Opcode {
    /// Map a wire value to an opcode; values outside the known set are rejected
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Opcode::Close),
            1 => Some(Opcode::Flush),
            2 => Some(Opcode::PutUserKv),
            3 => Some(Opcode::GetUserKv),
            4 => Some(Opcode::DelUserKv),
            _ => None,
        }
    }
}

/// A parsed command.
///
/// Key and value arguments are zero-copy views into the command buffer; they
/// are only valid for the dispatch call that decoded them. The engine is
/// called synchronously within that same frame, so no lifetime extension is
/// needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Close the index and end the session
    Close,

    /// Flush pending index state (advisory; the session continues)
    Flush,

    /// Store a key/value pair
    Put { key: &'a [u8], value: &'a [u8] },

    /// Look up a value by key
    Get { key: &'a [u8] },

    /// Remove a key
    Delete { key: &'a [u8] },
}

impl Command<'_> {
    /// Get the command's opcode
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Close => Opcode::Close,
            Command::Flush => Opcode::Flush,
            Command::Put { .. } => Opcode::PutUserKv,
            Command::Get { .. } => Opcode::GetUserKv,
            Command::Delete { .. } => Opcode::DelUserKv,
        }
    }
}
