use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use ampdrive_frame::{encode_command, encode_ping};
use ampdrive_transport::{TransportError, UdpEndpoint};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::dispatch::{deliver, dispatch};
use crate::error::{Result, SessionError};
use crate::events::{DriveEvent, EventSink};

/// A fire-and-forget command session with one drive.
///
/// Sends go straight out on the caller's thread. Inbound datagrams are
/// handled by a background receive loop started with
/// [`DriveSession::start_receive_loop`]; it handles one datagram fully, then
/// waits for the next, until the session is shut down or dropped.
pub struct DriveSession {
    endpoint: UdpEndpoint,
    sink: Arc<dyn EventSink>,
    config: SessionConfig,
    armed: AtomicBool,
    receiver: Mutex<Option<ReceiveLoop>>,
}

struct ReceiveLoop {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl DriveSession {
    /// Build a session from an already connected endpoint.
    pub fn from_parts(
        endpoint: UdpEndpoint,
        config: SessionConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            endpoint,
            sink,
            config,
            armed: AtomicBool::new(false),
            receiver: Mutex::new(None),
        }
    }

    /// Send one SCL command, e.g. `"RV"`. No reply is awaited.
    pub fn send_command(&self, command: &str) -> Result<()> {
        let wire = encode_command(command);
        self.endpoint.send(&wire)?;
        self.sink.emit(DriveEvent::CommandSent {
            command: command.to_string(),
        });
        Ok(())
    }

    /// Send the opcode 99 ping.
    pub fn send_ping(&self) -> Result<()> {
        self.endpoint.send(&encode_ping())?;
        self.sink.emit(DriveEvent::PingSent);
        Ok(())
    }

    /// Arm the receive loop.
    ///
    /// Only one loop runs per session: calling this while armed returns
    /// [`SessionError::AlreadyArmed`] and leaves the running loop alone.
    pub fn start_receive_loop(&self) -> Result<()> {
        if self
            .armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::AlreadyArmed);
        }

        match self.spawn_receive_loop() {
            Ok(receive_loop) => {
                *self.lock_receiver() = Some(receive_loop);
                Ok(())
            }
            Err(err) => {
                self.armed.store(false, Ordering::Release);
                Err(err)
            }
        }
    }

    /// Whether the receive loop is running.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Stop the receive loop and wait for it to exit.
    ///
    /// Takes up to one poll interval. The session may be re-armed afterwards.
    pub fn shutdown(&self) {
        let Some(receive_loop) = self.lock_receiver().take() else {
            return;
        };

        receive_loop.running.store(false, Ordering::Release);
        if receive_loop.handle.join().is_err() {
            warn!("receive loop thread panicked");
        }
        self.armed.store(false, Ordering::Release);
        debug!("receive loop disarmed");
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.endpoint.local_addr().map_err(Into::into)
    }

    /// The drive address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.endpoint.remote_addr()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn spawn_receive_loop(&self) -> Result<ReceiveLoop> {
        let endpoint = self.endpoint.try_clone()?;
        endpoint.set_read_timeout(Some(self.config.poll_interval))?;

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let sink = Arc::clone(&self.sink);
        let buffer_size = self.config.recv_buffer_size;

        let handle = thread::Builder::new()
            .name("ampdrive-recv".to_string())
            .spawn(move || receive_loop(endpoint, sink, flag, buffer_size))
            .map_err(|err| SessionError::ReceiveLoop(err.to_string()))?;

        Ok(ReceiveLoop { running, handle })
    }

    fn lock_receiver(&self) -> std::sync::MutexGuard<'_, Option<ReceiveLoop>> {
        self.receiver.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DriveSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for DriveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveSession")
            .field("endpoint", &self.endpoint)
            .field("armed", &self.is_armed())
            .finish()
    }
}

fn receive_loop(
    endpoint: UdpEndpoint,
    sink: Arc<dyn EventSink>,
    running: Arc<AtomicBool>,
    buffer_size: usize,
) {
    let mut buf = vec![0u8; buffer_size];
    debug!(remote = %endpoint.remote_addr(), "receive loop armed");

    while running.load(Ordering::Acquire) {
        match endpoint.recv_from(&mut buf) {
            Ok((len, from)) => dispatch(&buf[..len], from, sink.as_ref()),
            Err(TransportError::Io(err))
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(err) => deliver(sink.as_ref(), || DriveEvent::ReceiveFailed {
                error: err.to_string(),
            }),
        }
    }

    debug!("receive loop stopped");
}
