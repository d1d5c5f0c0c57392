use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Local port the drive expects replies to go back to.
pub const DEFAULT_LOCAL_PORT: u16 = 7777;

/// Port the drive listens on for envelopes.
pub const DEFAULT_REMOTE_PORT: u16 = 7775;

/// Largest payload a single UDP datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Resolve a drive host (IP literal or DNS name) to a socket address.
///
/// The first address returned by the resolver wins.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?;

    addrs.next().ok_or_else(|| TransportError::Resolve {
        host: host.to_string(),
        port,
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
    })
}

/// Unspecified local address in the same family as `remote`.
pub(crate) fn local_bind_addr(remote: &SocketAddr, local_port: u16) -> SocketAddr {
    if remote.is_ipv6() {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, local_port))
    } else {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, local_port))
    }
}

/// Blocking UDP socket bound locally and connected to one drive.
///
/// Sends and receives are independent at the socket level, so a clone from
/// [`UdpEndpoint::try_clone`] can sit in a receive loop on another thread
/// while the original keeps sending.
pub struct UdpEndpoint {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl UdpEndpoint {
    /// Bind `local_port` (0 = ephemeral) and connect to `host:remote_port`.
    pub fn bind_connected(host: &str, local_port: u16, remote_port: u16) -> Result<Self> {
        let remote = resolve(host, remote_port)?;
        Self::bind_connected_addr(remote, local_port)
    }

    /// Same as [`UdpEndpoint::bind_connected`] for an already resolved address.
    pub fn bind_connected_addr(remote: SocketAddr, local_port: u16) -> Result<Self> {
        let local = local_bind_addr(&remote, local_port);

        let socket =
            UdpSocket::bind(local).map_err(|source| TransportError::Bind { addr: local, source })?;
        socket.connect(remote).map_err(|source| TransportError::Connect {
            addr: remote,
            source,
        })?;

        info!(%local, %remote, "udp endpoint connected to drive");

        Ok(Self { socket, remote })
    }

    /// Send one datagram to the drive.
    pub fn send(&self, datagram: &[u8]) -> Result<usize> {
        let sent = self.socket.send(datagram)?;
        debug!(len = sent, "datagram sent");
        Ok(sent)
    }

    /// Receive one datagram (blocking, subject to the read timeout).
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).map_err(Into::into)
    }

    /// Set the read timeout used by [`UdpEndpoint::recv_from`].
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Clone the endpoint (new descriptor, same bound and connected socket).
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            socket: self.socket.try_clone()?,
            remote: self.remote,
        })
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// The drive address this endpoint is connected to.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }
}

impl std::fmt::Debug for UdpEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpEndpoint")
            .field("local", &self.socket.local_addr().ok())
            .field("remote", &self.remote)
            .finish()
    }
}
