//! Drive sessions for the SCL/ping datagram protocol.
//!
//! A [`DriveSession`] owns the UDP endpoint for one drive. It sends SCL
//! commands and pings without waiting for replies, and runs a receive loop
//! that decodes every inbound datagram, reports it to an [`EventSink`] and
//! immediately waits for the next one. Malformed or unexpected datagrams
//! are reported, never fatal.

pub mod config;
pub mod connector;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod session;

#[cfg(feature = "async")]
pub mod async_session;

pub use config::{SessionConfig, DEFAULT_POLL_INTERVAL};
pub use connector::{connect, connect_with_config};
pub use dispatch::event_for;
pub use error::{Result, SessionError};
pub use events::{ChannelSink, DriveEvent, EventSink, TracingSink};
pub use session::DriveSession;

#[cfg(feature = "async")]
pub use async_session::AsyncDriveSession;
