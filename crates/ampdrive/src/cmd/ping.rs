use std::time::Instant;

use crate::cmd::{open_session, parse_duration, print_until, PingArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::OutputFormat;

pub fn run(args: PingArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = parse_duration(&args.wait)?;
    let (session, events) = open_session(&args.target)?;

    session
        .start_receive_loop()
        .map_err(|err| session_error("receive loop failed", err))?;
    session
        .send_ping()
        .map_err(|err| session_error("ping failed", err))?;

    let replies = print_until(
        &events,
        Instant::now() + wait,
        Some(1),
        &args.target.drive,
        format,
    );
    if replies == 0 {
        return Err(CliError::new(
            TIMEOUT,
            format!("no reply from {} within {:?}", args.target.drive, wait),
        ));
    }

    Ok(SUCCESS)
}
