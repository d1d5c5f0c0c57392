use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use ampdrive_session::DriveEvent;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    #[serde(flatten)]
    event: &'a DriveEvent,
    drive: String,
    timestamp: String,
}

pub fn print_event(event: &DriveEvent, drive: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EventOutput {
                event,
                drive: drive.to_string(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "DRIVE", "DETAIL"])
                .add_row(vec![
                    event.name().to_string(),
                    drive.to_string(),
                    event_detail(event),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} drive={} {}", event.name(), drive, event_detail(event));
        }
    }
}

/// One-line human description of an event's payload.
pub fn event_detail(event: &DriveEvent) -> String {
    match event {
        DriveEvent::CommandSent { command } => format!("command={command}"),
        DriveEvent::PingSent => "opcode=99".to_string(),
        DriveEvent::SclResponse { text, .. } => {
            format!("response={}", text.trim_end_matches('\r'))
        }
        DriveEvent::PingResponse { hex, value, .. } => match value {
            Some(value) => format!("hex={hex} value={value}"),
            None => format!("hex={hex}"),
        },
        DriveEvent::UnknownOpcode { opcode, len, .. } => format!("opcode={opcode} bytes={len}"),
        DriveEvent::ShortPacket { len, .. } => format!("too short to process, bytes={len}"),
        DriveEvent::ReceiveFailed { error } => format!("error={error}"),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_strips_trailing_cr_and_formats_values() {
        let from = "10.10.10.10:7775".parse().unwrap();
        assert_eq!(
            event_detail(&DriveEvent::SclResponse {
                from,
                text: "RV=100\r".to_string()
            }),
            "response=RV=100"
        );
        assert_eq!(
            event_detail(&DriveEvent::PingResponse {
                from,
                hex: "00-63-01-00-00-00".to_string(),
                value: Some(1)
            }),
            "hex=00-63-01-00-00-00 value=1"
        );
        assert_eq!(
            event_detail(&DriveEvent::UnknownOpcode {
                from,
                opcode: 250,
                len: 2
            }),
            "opcode=250 bytes=2"
        );
    }

    #[test]
    fn json_output_flattens_event_fields() {
        let event = DriveEvent::CommandSent {
            command: "SC".to_string(),
        };
        let out = EventOutput {
            event: &event,
            drive: "10.10.10.10".to_string(),
            timestamp: "0".to_string(),
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["event"], "command_sent");
        assert_eq!(json["command"], "SC");
        assert_eq!(json["drive"], "10.10.10.10");
    }
}
