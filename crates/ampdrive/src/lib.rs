//! Client for commanding motion-control drives over the SCL/UDP envelope protocol.
//!
//! Commands are short SCL strings (`"SC"`, `"RV"`, ...) wrapped in a 2-byte
//! opcode envelope and sent fire-and-forget; replies are decoded by opcode as
//! they arrive.
//!
//! # Crate Structure
//!
//! - [`transport`]: Connected UDP endpoint for one drive
//! - [`frame`]: Envelope codec and response classification
//! - [`session`]: Drive session with a self re-arming receive loop (behind `session` feature)
//!
//! ```no_run
//! # #[cfg(feature = "session")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let drive = ampdrive::session::connect("10.10.10.10")?;
//! drive.start_receive_loop()?;
//! drive.send_command("SC")?;
//! drive.send_ping()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "session"))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use ampdrive_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ampdrive_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use ampdrive_session::*;
}
