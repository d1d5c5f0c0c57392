mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ampdrive", version, about = "Command a motion-control drive over SCL/UDP")]
struct Cli {
    /// Output format for drive events.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_with_multiple_commands() {
        let cli = Cli::try_parse_from([
            "ampdrive",
            "send",
            "10.10.10.10",
            "SC",
            "RV",
            "--ping",
            "--wait",
            "1s",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.target.drive, "10.10.10.10");
                assert_eq!(args.target.local_port, 7777);
                assert_eq!(args.target.remote_port, 7775);
                assert_eq!(args.commands, vec!["SC", "RV"]);
                assert!(args.ping);
                assert_eq!(args.wait.as_deref(), Some("1s"));
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn send_requires_a_command() {
        let err = Cli::try_parse_from(["ampdrive", "send", "10.10.10.10"])
            .expect_err("missing command should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_monitor_with_repeated_commands() {
        let cli = Cli::try_parse_from([
            "ampdrive",
            "monitor",
            "drive.local",
            "-c",
            "SC",
            "--command",
            "IP",
            "--ping-interval",
            "500ms",
            "--local-port",
            "0",
        ])
        .expect("monitor args should parse");

        match cli.command {
            Command::Monitor(args) => {
                assert_eq!(args.commands, vec!["SC", "IP"]);
                assert_eq!(args.ping_interval.as_deref(), Some("500ms"));
                assert_eq!(args.target.local_port, 0);
            }
            other => panic!("expected monitor, got {other:?}"),
        }
    }

    #[test]
    fn parses_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["ampdrive", "ping", "10.10.10.10", "--format", "json"])
            .expect("ping args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Ping(_)));
    }
}
