use std::time::Duration;

use ampdrive_transport::{DEFAULT_LOCAL_PORT, DEFAULT_REMOTE_PORT, MAX_DATAGRAM_SIZE};

/// Default read timeout the blocking receive loop wakes up on to check for shutdown.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Drive session behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Local UDP port to bind. 0 picks an ephemeral port.
    pub local_port: u16,
    /// Drive UDP port.
    pub remote_port: u16,
    /// Receive buffer size; longer datagrams are truncated by the OS.
    pub recv_buffer_size: usize,
    /// How often the blocking receive loop checks for shutdown.
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_port: DEFAULT_LOCAL_PORT,
            remote_port: DEFAULT_REMOTE_PORT,
            recv_buffer_size: MAX_DATAGRAM_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Override the local port.
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// Override the drive port.
    pub fn with_remote_port(mut self, port: u16) -> Self {
        self.remote_port = port;
        self
    }

    /// Override the receive buffer size (at least one byte).
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size.max(1);
        self
    }

    /// Override the shutdown poll interval. A zero interval is bumped to 1ms,
    /// since a zero read timeout is rejected by the socket.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }
}
