use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("ampdrive {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: ampdrive");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("AMPDRIVE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: session={}, async={}, cli=true",
        cfg!(feature = "session"),
        cfg!(feature = "async")
    );
    println!(
        "protocol: scl opcode={}, ping opcode={}, default ports local={} remote={}",
        ampdrive_frame::SCL,
        ampdrive_frame::PING,
        ampdrive_transport::DEFAULT_LOCAL_PORT,
        ampdrive_transport::DEFAULT_REMOTE_PORT
    );

    Ok(SUCCESS)
}
