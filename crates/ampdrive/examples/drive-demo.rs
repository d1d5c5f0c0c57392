//! Minimal drive session: arm the receive loop, send `SC` and a ping, then
//! print replies until Enter is pressed.
//!
//! Run with:
//!   cargo run --example drive-demo -- 10.10.10.10

use std::io::BufRead;
use std::sync::Arc;

use ampdrive::session::{connect_with_config, DriveEvent, EventSink, SessionConfig};

struct PrintSink;

impl EventSink for PrintSink {
    fn emit(&self, event: DriveEvent) {
        match event {
            DriveEvent::SclResponse { text, .. } => {
                eprintln!("SCL response: {}", text.trim_end_matches('\r'));
            }
            DriveEvent::PingResponse { hex, value, .. } => {
                eprintln!("Ping response: {hex}");
                if let Some(value) = value {
                    eprintln!("Ping value: {value}");
                }
            }
            DriveEvent::UnknownOpcode { opcode, len, .. } => {
                eprintln!("Unknown opcode {opcode} ({len} bytes)");
            }
            DriveEvent::ShortPacket { len, .. } => {
                eprintln!("Packet too short to process ({len} bytes)");
            }
            DriveEvent::ReceiveFailed { error } => eprintln!("Receive failed: {error}"),
            DriveEvent::CommandSent { .. } | DriveEvent::PingSent => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let drive = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "10.10.10.10".to_string());

    let sink: Arc<dyn EventSink> = Arc::new(PrintSink);
    let session = connect_with_config(&drive, SessionConfig::default(), Some(sink))?;
    eprintln!(
        "Talking to {} from {}",
        session.remote_addr(),
        session.local_addr()?
    );

    session.start_receive_loop()?;
    session.send_command("SC")?;
    session.send_ping()?;

    eprintln!("Press Enter to exit");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    session.shutdown();
    Ok(())
}
