/// Errors that can occur while decoding an inbound datagram.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The datagram is too short to carry an opcode.
    #[error("packet too short to process ({len} bytes, need at least 2)")]
    ShortPacket { len: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
