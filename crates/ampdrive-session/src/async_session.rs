use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ampdrive_frame::{encode_command, encode_ping};
use ampdrive_transport::AsyncUdpEndpoint;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::dispatch::{deliver, dispatch};
use crate::error::{Result, SessionError};
use crate::events::{DriveEvent, EventSink, TracingSink};

/// Tokio flavor of [`crate::DriveSession`].
///
/// The receive loop is a spawned task awaiting successive datagrams; sends
/// share the same socket and never wait on it.
pub struct AsyncDriveSession {
    endpoint: AsyncUdpEndpoint,
    sink: Arc<dyn EventSink>,
    config: SessionConfig,
    armed: AtomicBool,
    task: Mutex<Option<ReceiveTask>>,
}

struct ReceiveTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AsyncDriveSession {
    /// Connect to a drive. `None` for `sink` logs events through `tracing`.
    pub async fn connect(
        drive: &str,
        config: SessionConfig,
        sink: Option<Arc<dyn EventSink>>,
    ) -> Result<Self> {
        let endpoint =
            AsyncUdpEndpoint::bind_connected(drive, config.local_port, config.remote_port).await?;
        let sink: Arc<dyn EventSink> = match sink {
            Some(sink) => sink,
            None => Arc::new(TracingSink),
        };
        Ok(Self::from_parts(endpoint, config, sink))
    }

    /// Build a session from an already connected endpoint.
    pub fn from_parts(
        endpoint: AsyncUdpEndpoint,
        config: SessionConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            endpoint,
            sink,
            config,
            armed: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// Send one SCL command. No reply is awaited.
    pub async fn send_command(&self, command: &str) -> Result<()> {
        self.endpoint.send(&encode_command(command)).await?;
        self.sink.emit(DriveEvent::CommandSent {
            command: command.to_string(),
        });
        Ok(())
    }

    /// Send the opcode 99 ping.
    pub async fn send_ping(&self) -> Result<()> {
        self.endpoint.send(&encode_ping()).await?;
        self.sink.emit(DriveEvent::PingSent);
        Ok(())
    }

    /// Spawn the receive task on the current tokio runtime.
    ///
    /// Returns [`SessionError::AlreadyArmed`] if a task is already running.
    pub fn start_receive_loop(&self) -> Result<()> {
        if self
            .armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::AlreadyArmed);
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                self.armed.store(false, Ordering::Release);
                return Err(SessionError::ReceiveLoop(err.to_string()));
            }
        };

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(receive_task(
            self.endpoint.clone(),
            Arc::clone(&self.sink),
            cancel.clone(),
            self.config.recv_buffer_size,
        ));
        *self.lock_task() = Some(ReceiveTask { cancel, handle });
        Ok(())
    }

    /// Whether the receive task is running.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Cancel the receive task and wait for it to finish.
    pub async fn shutdown(&self) {
        let Some(task) = self.lock_task().take() else {
            return;
        };

        task.cancel.cancel();
        if let Err(err) = task.handle.await {
            warn!(error = %err, "receive task ended abnormally");
        }
        self.armed.store(false, Ordering::Release);
        debug!("receive task disarmed");
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

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<ReceiveTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AsyncDriveSession {
    fn drop(&mut self) {
        if let Some(task) = self.lock_task().take() {
            task.cancel.cancel();
        }
    }
}

async fn receive_task(
    endpoint: AsyncUdpEndpoint,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
    buffer_size: usize,
) {
    let mut buf = vec![0u8; buffer_size];
    debug!(remote = %endpoint.remote_addr(), "receive task armed");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = endpoint.recv_from(&mut buf) => match received {
                Ok((len, from)) => dispatch(&buf[..len], from, sink.as_ref()),
                Err(err) => deliver(sink.as_ref(), || DriveEvent::ReceiveFailed {
                    error: err.to_string(),
                }),
            },
        }
    }

    debug!("receive task stopped");
}
