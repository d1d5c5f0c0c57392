//! Connected UDP endpoint for a single motion-control drive.
//!
//! The drive listens on a fixed UDP port and answers to whatever local port
//! the client sends from. This crate binds that local port, resolves the
//! drive address and connects the socket so that only the drive's datagrams
//! are delivered.
//!
//! This is the lowest layer of ampdrive. Everything else builds on top of
//! [`UdpEndpoint`] (or [`AsyncUdpEndpoint`] with the `async` feature).

pub mod error;
pub mod udp;

#[cfg(feature = "async")]
pub mod async_udp;

pub use error::{Result, TransportError};
pub use udp::{resolve, UdpEndpoint, DEFAULT_LOCAL_PORT, DEFAULT_REMOTE_PORT, MAX_DATAGRAM_SIZE};

#[cfg(feature = "async")]
pub use async_udp::AsyncUdpEndpoint;
