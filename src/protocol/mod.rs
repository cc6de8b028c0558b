//! Protocol Module
//!
//! Defines the wire protocol between the controlling client and the worker.
//!
//! ## Wire Format (all integers big-endian, unsigned)
//!
//! Every unit on the channel is a self-delimited frame:
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │         Payload             │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### Command Payload
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │Opcode (4)│         Body                │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### Opcodes
//! - 0: CLOSE        - Body: empty
//! - 1: FLUSH        - Body: empty
//! - 2: PUT_USER_KV  - Body: binary(key) + binary(value)
//! - 3: GET_USER_KV  - Body: binary(key)
//! - 4: DEL_USER_KV  - Body: binary(key)
//!
//! where `binary(x)` is `len (4) + bytes[len]`.
//!
//! ### Reply Payload
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │Status (1)│         Payload             │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0: OK
//! - 1: ERROR (recoverable; the worker keeps serving)

mod command;
mod reply;
mod codec;

pub use command::{Command, Opcode};
pub use reply::{Reply, Status};
pub use codec::{
    Cursor, MAX_FRAME_SIZE,
    encode_command, decode_command,
    encode_reply, decode_reply,
    read_frame, write_command, read_reply, write_reply,
};
