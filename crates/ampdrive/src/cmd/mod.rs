use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ampdrive_session::{
    connect_with_config, ChannelSink, DriveEvent, DriveSession, EventSink, SessionConfig,
};
use ampdrive_transport::{DEFAULT_LOCAL_PORT, DEFAULT_REMOTE_PORT};
use clap::{Args, Subcommand};

use crate::exit::{session_error, CliError, CliResult, USAGE};
use crate::output::{print_event, OutputFormat};

pub mod monitor;
pub mod ping;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one or more SCL commands.
    Send(SendArgs),
    /// Send a ping and print the drive's reply.
    Ping(PingArgs),
    /// Listen to a drive, sending periodic pings, until interrupted.
    Monitor(MonitorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Ping(args) => ping::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DriveArgs {
    /// Drive IP address or host name.
    #[arg(env = "AMPDRIVE_DRIVE")]
    pub drive: String,
    /// Local UDP port the drive replies to (0 = ephemeral).
    #[arg(long, env = "AMPDRIVE_LOCAL_PORT", default_value_t = DEFAULT_LOCAL_PORT)]
    pub local_port: u16,
    /// Drive UDP port.
    #[arg(long, env = "AMPDRIVE_REMOTE_PORT", default_value_t = DEFAULT_REMOTE_PORT)]
    pub remote_port: u16,
}

impl DriveArgs {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_local_port(self.local_port)
            .with_remote_port(self.remote_port)
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub target: DriveArgs,
    /// SCL commands to send, in order (e.g. SC RV).
    #[arg(required = true, num_args = 1..)]
    pub commands: Vec<String>,
    /// Also send a ping after the commands.
    #[arg(long)]
    pub ping: bool,
    /// Listen for replies for this long before exiting (e.g. 2s, 500ms).
    #[arg(long)]
    pub wait: Option<String>,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub target: DriveArgs,
    /// How long to listen for the reply (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub wait: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub target: DriveArgs,
    /// SCL command to send at startup (repeatable).
    #[arg(long = "command", short = 'c')]
    pub commands: Vec<String>,
    /// Liveness ping period (e.g. 1s). Disabled when omitted.
    #[arg(long)]
    pub ping_interval: Option<String>,
    /// Exit after N replies from the drive.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit after this long (e.g. 30s).
    #[arg(long)]
    pub duration: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Connect a session whose events land on the returned channel.
pub(crate) fn open_session(target: &DriveArgs) -> CliResult<(DriveSession, Receiver<DriveEvent>)> {
    let (tx, rx) = mpsc::channel();
    let sink: Arc<dyn EventSink> = Arc::new(ChannelSink::new(tx));
    let session = connect_with_config(&target.drive, target.session_config(), Some(sink))
        .map_err(|err| session_error("connect failed", err))?;
    Ok((session, rx))
}

/// Print events until `deadline`, or until `limit` drive replies were seen.
/// Returns how many replies were printed.
pub(crate) fn print_until(
    events: &Receiver<DriveEvent>,
    deadline: Instant,
    limit: Option<usize>,
    drive: &str,
    format: OutputFormat,
) -> usize {
    let mut replies = 0usize;
    loop {
        let now = Instant::now();
        if now >= deadline || limit.is_some_and(|limit| replies >= limit) {
            return replies;
        }
        match events.recv_timeout(deadline - now) {
            Ok(event) => {
                if event.is_reply() {
                    replies = replies.saturating_add(1);
                }
                print_event(&event, drive, format);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => return replies,
            Err(mpsc::RecvTimeoutError::Disconnected) => return replies,
        }
    }
}

/// Print whatever is already queued without waiting.
pub(crate) fn print_pending(events: &Receiver<DriveEvent>, drive: &str, format: OutputFormat) {
    while let Ok(event) = events.try_recv() {
        print_event(&event, drive, format);
    }
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
