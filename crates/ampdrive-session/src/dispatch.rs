use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};

use ampdrive_frame::{hex_dashed, opcode_name, Response};
use tracing::{error, trace};

use crate::events::{DriveEvent, EventSink};

/// Map one inbound datagram onto the event it produces.
pub fn event_for(datagram: &[u8], from: SocketAddr) -> DriveEvent {
    let response = Response::classify(datagram);
    if let Some(opcode) = response.opcode() {
        trace!(%from, opcode, kind = opcode_name(opcode), len = datagram.len(), "datagram received");
    }

    match response {
        Response::Scl { text } => DriveEvent::SclResponse { from, text },
        Response::Ping { raw, value } => DriveEvent::PingResponse {
            from,
            hex: hex_dashed(&raw),
            value,
        },
        Response::Unknown { opcode, len } => DriveEvent::UnknownOpcode { from, opcode, len },
        Response::Malformed { len } => DriveEvent::ShortPacket { from, len },
    }
}

/// Handle one inbound datagram to completion.
///
/// A panic in the sink is contained here so the calling loop keeps running.
pub(crate) fn dispatch(datagram: &[u8], from: SocketAddr, sink: &dyn EventSink) {
    deliver(sink, || event_for(datagram, from));
}

/// Emit an event, containing any panic raised while building or handling it.
pub(crate) fn deliver(sink: &dyn EventSink, event: impl FnOnce() -> DriveEvent) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.emit(event())));
    if let Err(payload) = outcome {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        error!(%reason, "event handler panicked; receive loop continues");
    }
}
