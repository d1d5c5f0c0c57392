use std::net::SocketAddr;
use std::sync::mpsc::Sender;

use serde::Serialize;
use tracing::{info, warn};

/// Something observable a drive session did or received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DriveEvent {
    /// An SCL command envelope was sent.
    CommandSent { command: String },
    /// A ping envelope was sent.
    PingSent,
    /// Opcode 7 reply, payload read as ASCII.
    SclResponse { from: SocketAddr, text: String },
    /// Opcode 99 reply. `hex` covers the whole datagram.
    PingResponse {
        from: SocketAddr,
        hex: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<i32>,
    },
    /// Opcode outside {7, 99}.
    UnknownOpcode {
        from: SocketAddr,
        opcode: u16,
        len: usize,
    },
    /// Datagram shorter than the opcode header.
    ShortPacket { from: SocketAddr, len: usize },
    /// The socket reported an error while waiting for a datagram.
    ReceiveFailed { error: String },
}

impl DriveEvent {
    /// Stable event name, matching the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            DriveEvent::CommandSent { .. } => "command_sent",
            DriveEvent::PingSent => "ping_sent",
            DriveEvent::SclResponse { .. } => "scl_response",
            DriveEvent::PingResponse { .. } => "ping_response",
            DriveEvent::UnknownOpcode { .. } => "unknown_opcode",
            DriveEvent::ShortPacket { .. } => "short_packet",
            DriveEvent::ReceiveFailed { .. } => "receive_failed",
        }
    }

    /// True for events decoded from a datagram the drive sent.
    ///
    /// Socket errors seen by the receive loop are not replies.
    pub fn is_reply(&self) -> bool {
        matches!(
            self,
            DriveEvent::SclResponse { .. }
                | DriveEvent::PingResponse { .. }
                | DriveEvent::UnknownOpcode { .. }
                | DriveEvent::ShortPacket { .. }
        )
    }
}

/// Destination for session events.
///
/// Called from the receive loop thread (or task) as well as from senders,
/// so implementations must be cheap and thread-safe.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DriveEvent);
}

/// Logs every event through `tracing`. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: DriveEvent) {
        match &event {
            DriveEvent::CommandSent { command } => info!(%command, "sent command"),
            DriveEvent::PingSent => info!("sent ping"),
            DriveEvent::SclResponse { from, text } => {
                info!(%from, response = %text.trim_end_matches('\r'), "received scl response")
            }
            DriveEvent::PingResponse { from, hex, value } => {
                info!(%from, %hex, ?value, "received ping response")
            }
            DriveEvent::UnknownOpcode { from, opcode, len } => {
                info!(%from, opcode, len, "received unknown opcode")
            }
            DriveEvent::ShortPacket { from, len } => {
                warn!(%from, len, "received packet too short to process")
            }
            DriveEvent::ReceiveFailed { error } => warn!(%error, "receive failed"),
        }
    }
}

/// Forwards events into an mpsc channel. Events are dropped once the
/// receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<DriveEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<DriveEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: DriveEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn drive() -> SocketAddr {
        "10.10.10.10:7775".parse().unwrap()
    }

    #[test]
    fn serializes_with_event_tag() {
        let event = DriveEvent::PingResponse {
            from: drive(),
            hex: "00-63-01-00-00-00".to_string(),
            value: Some(1),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "ping_response");
        assert_eq!(json["from"], "10.10.10.10:7775");
        assert_eq!(json["value"], 1);

        let bare = serde_json::to_value(DriveEvent::PingSent).unwrap();
        assert_eq!(bare, serde_json::json!({ "event": "ping_sent" }));
    }

    #[test]
    fn omits_missing_ping_value() {
        let event = DriveEvent::PingResponse {
            from: drive(),
            hex: "00-63".to_string(),
            value: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("value").is_none());
    }

    #[test]
    fn names_match_serialized_tags() {
        let events = [
            DriveEvent::CommandSent {
                command: "SC".to_string(),
            },
            DriveEvent::PingSent,
            DriveEvent::ShortPacket {
                from: drive(),
                len: 1,
            },
            DriveEvent::UnknownOpcode {
                from: drive(),
                opcode: 250,
                len: 2,
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.name());
        }
    }

    #[test]
    fn only_decoded_datagrams_are_replies() {
        assert!(!DriveEvent::PingSent.is_reply());
        assert!(!DriveEvent::CommandSent {
            command: "SC".to_string()
        }
        .is_reply());
        assert!(!DriveEvent::ReceiveFailed {
            error: "Connection refused (os error 111)".to_string()
        }
        .is_reply());
        assert!(DriveEvent::ShortPacket { from: drive(), len: 1 }.is_reply());
        assert!(DriveEvent::UnknownOpcode {
            from: drive(),
            opcode: 250,
            len: 2
        }
        .is_reply());
    }

    #[test]
    fn channel_sink_forwards_and_ignores_closed_receiver() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.emit(DriveEvent::PingSent);
        assert_eq!(rx.recv().unwrap(), DriveEvent::PingSent);

        drop(rx);
        sink.emit(DriveEvent::PingSent);
    }
}
