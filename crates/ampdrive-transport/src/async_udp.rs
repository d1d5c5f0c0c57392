use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::udp::local_bind_addr;

/// Tokio UDP socket bound locally and connected to one drive.
///
/// The socket is held in an `Arc` so a receive task and senders can share it;
/// tokio allows concurrent `send` and `recv_from` on the same socket.
#[derive(Debug, Clone)]
pub struct AsyncUdpEndpoint {
    socket: Arc<UdpSocket>,
    remote: SocketAddr,
}

impl AsyncUdpEndpoint {
    /// Bind `local_port` (0 = ephemeral) and connect to `host:remote_port`.
    pub async fn bind_connected(host: &str, local_port: u16, remote_port: u16) -> Result<Self> {
        let remote = tokio::net::lookup_host((host, remote_port))
            .await
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                port: remote_port,
                source,
            })?
            .next()
            .ok_or_else(|| TransportError::Resolve {
                host: host.to_string(),
                port: remote_port,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
            })?;

        Self::bind_connected_addr(remote, local_port).await
    }

    /// Same as [`AsyncUdpEndpoint::bind_connected`] for an already resolved address.
    pub async fn bind_connected_addr(remote: SocketAddr, local_port: u16) -> Result<Self> {
        let local = local_bind_addr(&remote, local_port);

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| TransportError::Bind { addr: local, source })?;
        socket
            .connect(remote)
            .await
            .map_err(|source| TransportError::Connect {
                addr: remote,
                source,
            })?;

        info!(%local, %remote, "async udp endpoint connected to drive");

        Ok(Self {
            socket: Arc::new(socket),
            remote,
        })
    }

    /// Send one datagram to the drive.
    pub async fn send(&self, datagram: &[u8]) -> Result<usize> {
        let sent = self.socket.send(datagram).await?;
        debug!(len = sent, "datagram sent");
        Ok(sent)
    }

    /// Wait for the next datagram.
    pub async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await.map_err(Into::into)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_async_roundtrip_with_fake_drive() {
        let drive = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = drive.local_addr().unwrap().port();

        let endpoint = AsyncUdpEndpoint::bind_connected("127.0.0.1", 0, port)
            .await
            .unwrap();
        endpoint.send(&[0, 99]).await.unwrap();

        let mut buf = [0u8; 16];
        let (n, from) = drive.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0, 99]);

        drive.send_to(&[0, 99, 1, 0, 0, 0], from).await.unwrap();
        let (n, src) = endpoint.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0, 99, 1, 0, 0, 0]);
        assert_eq!(src, endpoint.remote_addr());
    }

    #[tokio::test]
    async fn test_async_bind_fails_when_port_taken() {
        let holder = UdpSocket::bind("0.0.0.0:0").await.unwrap();
        let taken = holder.local_addr().unwrap().port();

        let result = AsyncUdpEndpoint::bind_connected("127.0.0.1", taken, 7775).await;
        assert!(matches!(result, Err(TransportError::Bind { .. })));
    }
}
