use std::time::Instant;

use crate::cmd::{open_session, parse_duration, print_pending, print_until, SendArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = args.wait.as_deref().map(parse_duration).transpose()?;
    let (session, events) = open_session(&args.target)?;

    // Arm before sending so a fast reply is not missed.
    if wait.is_some() {
        session
            .start_receive_loop()
            .map_err(|err| session_error("receive loop failed", err))?;
    }

    for command in &args.commands {
        session
            .send_command(command)
            .map_err(|err| session_error("send failed", err))?;
    }
    if args.ping {
        session
            .send_ping()
            .map_err(|err| session_error("ping failed", err))?;
    }

    match wait {
        Some(wait) => {
            let replies = print_until(
                &events,
                Instant::now() + wait,
                None,
                &args.target.drive,
                format,
            );
            tracing::debug!(replies, "wait elapsed");
        }
        None => print_pending(&events, &args.target.drive, format),
    }

    Ok(SUCCESS)
}
