/// Errors that can occur in drive session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error (bind, resolve, connect or send).
    #[error("transport error: {0}")]
    Transport(#[from] ampdrive_transport::TransportError),

    /// The receive loop is already running for this session.
    #[error("receive loop already armed")]
    AlreadyArmed,

    /// The receive loop could not be started.
    #[error("receive loop failed to start: {0}")]
    ReceiveLoop(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
