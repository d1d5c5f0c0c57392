//! Opcodes carried in the 2-byte big-endian datagram header.
//!
//! Only two opcodes are understood. Anything else is reported as unknown
//! and left alone.

/// SCL command (outbound) and SCL response (inbound).
pub const SCL: u16 = 7;

/// Ping (outbound) and ping response (inbound).
pub const PING: u16 = 99;

/// Terminator appended to outbound SCL commands (carriage return).
pub const CR: u8 = 13;

/// Returns a human-readable name for an opcode.
pub fn opcode_name(opcode: u16) -> &'static str {
    match opcode {
        SCL => "SCL",
        PING => "PING",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_known_and_unknown_opcodes() {
        assert_eq!(opcode_name(SCL), "SCL");
        assert_eq!(opcode_name(PING), "PING");
        assert_eq!(opcode_name(250), "UNKNOWN");
    }
}
