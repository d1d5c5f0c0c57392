use bytes::Bytes;

use crate::codec::decode;
use crate::error::FrameError;
use crate::opcode::{PING, SCL};

/// An inbound datagram classified by opcode.
///
/// Adding an opcode means adding a variant here, and every consumer that
/// matches on `Response` stops compiling until it handles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Opcode 7: SCL reply text.
    Scl { text: String },
    /// Opcode 99: ping reply. `raw` is the whole datagram, opcode included.
    Ping { raw: Bytes, value: Option<i32> },
    /// Any other opcode. Informational only.
    Unknown { opcode: u16, len: usize },
    /// Too short to carry an opcode.
    Malformed { len: usize },
}

impl Response {
    /// Decode and classify one datagram. Never fails.
    pub fn classify(datagram: &[u8]) -> Self {
        match decode(datagram) {
            Ok(decoded) => match decoded.opcode {
                SCL => Response::Scl {
                    text: decoded.scl_text(),
                },
                PING => Response::Ping {
                    raw: Bytes::copy_from_slice(datagram),
                    value: decoded.ping_value(),
                },
                opcode => Response::Unknown {
                    opcode,
                    len: datagram.len(),
                },
            },
            Err(FrameError::ShortPacket { len }) => Response::Malformed { len },
        }
    }

    /// Opcode of the datagram, if it had one.
    pub fn opcode(&self) -> Option<u16> {
        match self {
            Response::Scl { .. } => Some(SCL),
            Response::Ping { .. } => Some(PING),
            Response::Unknown { opcode, .. } => Some(*opcode),
            Response::Malformed { .. } => None,
        }
    }
}

/// Bytes as ASCII text; anything above 0x7F becomes `?`.
pub fn ascii_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// Uppercase hex bytes separated by dashes, e.g. `00-63-01-00`.
pub fn hex_dashed(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().saturating_mul(3));
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push('-');
        }
        out.push_str(&format!("{b:02X}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scl_response() {
        assert_eq!(
            Response::classify(&[0, 7, 83, 67]),
            Response::Scl {
                text: "SC".to_string()
            }
        );
    }

    #[test]
    fn classifies_ping_response_with_value() {
        let response = Response::classify(&[0, 99, 1, 0, 0, 0]);
        match response {
            Response::Ping { raw, value } => {
                assert_eq!(raw.as_ref(), &[0, 99, 1, 0, 0, 0]);
                assert_eq!(value, Some(1));
            }
            other => panic!("expected ping, got {other:?}"),
        }
    }

    #[test]
    fn classifies_bare_ping_without_value() {
        let response = Response::classify(&[0, 99]);
        assert!(matches!(response, Response::Ping { value: None, .. }));
        assert_eq!(response.opcode(), Some(PING));
    }

    #[test]
    fn classifies_unknown_opcode() {
        assert_eq!(
            Response::classify(&[0, 250]),
            Response::Unknown {
                opcode: 250,
                len: 2
            }
        );
    }

    #[test]
    fn classifies_short_packets_as_malformed() {
        assert_eq!(Response::classify(&[]), Response::Malformed { len: 0 });
        assert_eq!(Response::classify(&[9]), Response::Malformed { len: 1 });
        assert_eq!(Response::classify(&[9]).opcode(), None);
    }

    #[test]
    fn scl_text_masks_high_bytes() {
        assert_eq!(ascii_text(b"OK\r"), "OK\r");
        assert_eq!(ascii_text(&[b'R', 0xC8]), "R?");
    }

    #[test]
    fn hex_formatting_matches_dashed_uppercase() {
        assert_eq!(hex_dashed(&[0x00, 0x63, 0x0A, 0xFF]), "00-63-0A-FF");
        assert_eq!(hex_dashed(&[]), "");
    }
}
