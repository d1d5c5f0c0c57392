use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cmd::{open_session, parse_duration, print_until, MonitorArgs};
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::OutputFormat;

/// Upper bound on how long the loop sleeps before re-checking Ctrl-C.
const TICK: Duration = Duration::from_millis(100);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let ping_every = args
        .ping_interval
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let stop_at = args
        .duration
        .as_deref()
        .map(parse_duration)
        .transpose()?
        .map(|duration| Instant::now() + duration);

    let (session, events) = open_session(&args.target)?;
    session
        .start_receive_loop()
        .map_err(|err| session_error("receive loop failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    for command in &args.commands {
        session
            .send_command(command)
            .map_err(|err| session_error("send failed", err))?;
    }

    let mut next_ping = ping_every.map(|_| Instant::now());
    let mut received = 0usize;

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if stop_at.is_some_and(|stop_at| now >= stop_at) {
            break;
        }

        if let (Some(due), Some(interval)) = (next_ping, ping_every) {
            if now >= due {
                // A lost ping is not fatal; the next one goes out on schedule.
                if let Err(err) = session.send_ping() {
                    tracing::warn!(error = %err, "liveness ping failed");
                }
                next_ping = Some(now + interval);
            }
        }

        let mut wake = now + TICK;
        if let Some(due) = next_ping {
            wake = wake.min(due);
        }
        if let Some(stop_at) = stop_at {
            wake = wake.min(stop_at);
        }

        let remaining = args.count.map(|count| count.saturating_sub(received));
        received += print_until(&events, wake, remaining, &args.target.drive, format);

        if args.count.is_some_and(|count| received >= count) {
            return Ok(SUCCESS);
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
