use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::opcode::{CR, PING, SCL};

/// Datagram header: opcode (2 bytes, big-endian).
pub const HEADER_SIZE: usize = 2;

/// Bytes of a ping response payload read as the numeric value.
pub const PING_VALUE_SIZE: usize = 4;

static PING_ENVELOPE: [u8; HEADER_SIZE] = PING.to_be_bytes();

/// A decoded inbound datagram: opcode plus the bytes that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// Opcode from the first two bytes.
    pub opcode: u16,
    /// Everything after the opcode, uninterpreted.
    pub payload: Bytes,
}

impl Datagram {
    /// Create a datagram.
    pub fn new(opcode: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            payload: payload.into(),
        }
    }

    /// Payload read as ASCII text.
    pub fn scl_text(&self) -> String {
        crate::response::ascii_text(&self.payload)
    }

    /// First four payload bytes as a little-endian `i32`.
    ///
    /// The drive's ping reply layout is undocumented; this reading is a
    /// convention. Returns `None` when fewer than four payload bytes arrived.
    pub fn ping_value(&self) -> Option<i32> {
        let bytes: [u8; PING_VALUE_SIZE] = self.payload.get(..PING_VALUE_SIZE)?.try_into().ok()?;
        Some(i32::from_le_bytes(bytes))
    }
}

/// Encode an SCL command envelope.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────────┬────────────┐
/// │ Opcode (2B)  │ Command (ASCII)      │ CR (1B)    │
/// │ 0x00 0x07    │ e.g. "RV", "SC"      │ 0x0D       │
/// └──────────────┴──────────────────────┴────────────┘
/// ```
///
/// Characters outside ASCII are sent as `?`.
pub fn encode_command(command: &str) -> Bytes {
    let mut dst = BytesMut::new();
    encode_command_into(command, &mut dst);
    dst.freeze()
}

/// Append an SCL command envelope to `dst`.
pub fn encode_command_into(command: &str, dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + command.len() + 1);
    dst.put_u16(SCL);
    for ch in command.chars() {
        dst.put_u8(if ch.is_ascii() { ch as u8 } else { b'?' });
    }
    dst.put_u8(CR);
}

/// Encode the ping envelope: opcode 99 and nothing else.
pub fn encode_ping() -> Bytes {
    Bytes::from_static(&PING_ENVELOPE)
}

/// Decode an inbound datagram into opcode and payload.
///
/// Datagrams shorter than the header yield [`FrameError::ShortPacket`].
/// The payload is sliced, never interpreted.
pub fn decode(datagram: &[u8]) -> Result<Datagram> {
    if datagram.len() < HEADER_SIZE {
        trace!(len = datagram.len(), "short datagram");
        return Err(FrameError::ShortPacket {
            len: datagram.len(),
        });
    }

    let opcode = u16::from_be_bytes([datagram[0], datagram[1]]);
    Ok(Datagram::new(
        opcode,
        Bytes::copy_from_slice(&datagram[HEADER_SIZE..]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command_layout() {
        let wire = encode_command("RV");
        assert_eq!(wire.as_ref(), &[0x00, 0x07, b'R', b'V', 0x0D]);
    }

    #[test]
    fn test_command_payload_recoverable_after_decode() {
        for command in ["SC", "RV", "FL20000", "DI-8000", ""] {
            let datagram = decode(&encode_command(command)).unwrap();
            assert_eq!(datagram.opcode, SCL);

            let (text, terminator) = datagram.payload.split_at(datagram.payload.len() - 1);
            assert_eq!(text, command.as_bytes());
            assert_eq!(terminator, &[CR]);
        }
    }

    #[test]
    fn test_encode_command_replaces_non_ascii() {
        let wire = encode_command("VE1.5µ");
        assert_eq!(&wire[2..wire.len() - 1], b"VE1.5?");
    }

    #[test]
    fn test_encode_command_into_appends() {
        let mut buf = BytesMut::from(&b"xx"[..]);
        encode_command_into("SC", &mut buf);
        assert_eq!(buf.as_ref(), &[b'x', b'x', 0, 7, b'S', b'C', 13]);
    }

    #[test]
    fn test_encode_ping_is_two_bytes() {
        assert_eq!(encode_ping().as_ref(), &[0, 99]);
    }

    #[test]
    fn test_decode_short_packets() {
        assert_eq!(decode(&[]), Err(FrameError::ShortPacket { len: 0 }));
        assert_eq!(decode(&[7]), Err(FrameError::ShortPacket { len: 1 }));
    }

    #[test]
    fn test_decode_scl_response() {
        let datagram = decode(&[0, 7, 83, 67]).unwrap();
        assert_eq!(datagram.opcode, SCL);
        assert_eq!(datagram.scl_text(), "SC");
        assert_eq!(datagram, Datagram::new(SCL, &b"SC"[..]));
    }

    #[test]
    fn test_decode_ping_response_value() {
        let datagram = decode(&[0, 99, 1, 0, 0, 0]).unwrap();
        assert_eq!(datagram.opcode, PING);
        assert_eq!(datagram.ping_value(), Some(1));

        let negative = decode(&[0, 99, 0xFE, 0xFF, 0xFF, 0xFF, 0xAA]).unwrap();
        assert_eq!(negative.ping_value(), Some(-2));
    }

    #[test]
    fn test_decode_ping_without_value() {
        let bare = decode(&[0, 99]).unwrap();
        assert_eq!(bare.opcode, PING);
        assert!(bare.payload.is_empty());
        assert_eq!(bare.ping_value(), None);

        let partial = decode(&[0, 99, 1, 2, 3]).unwrap();
        assert_eq!(partial.ping_value(), None);
    }

    #[test]
    fn test_decode_opcode_is_big_endian() {
        assert_eq!(decode(&[0, 250]).unwrap().opcode, 250);
        assert_eq!(decode(&[1, 2]).unwrap().opcode, 258);
    }
}
