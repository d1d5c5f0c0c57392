//! Opcode envelope codec for the drive datagram protocol.
//!
//! Every datagram starts with a 2-byte big-endian opcode:
//! - opcode 7 carries SCL text (outbound commands end in a CR byte)
//! - opcode 99 is a ping; responses may carry a little-endian `i32`
//!
//! Encoding and decoding are pure functions over byte slices. Nothing here
//! touches a socket.

pub mod codec;
pub mod error;
pub mod opcode;
pub mod response;

pub use codec::{
    decode, encode_command, encode_command_into, encode_ping, Datagram, HEADER_SIZE,
    PING_VALUE_SIZE,
};
pub use error::{FrameError, Result};
pub use opcode::{opcode_name, CR, PING, SCL};
pub use response::{ascii_text, hex_dashed, Response};
