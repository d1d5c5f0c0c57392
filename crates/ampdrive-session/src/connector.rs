use std::sync::Arc;

use ampdrive_transport::UdpEndpoint;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::events::{EventSink, TracingSink};
use crate::session::DriveSession;

/// Connect to a drive on the default ports, logging events through `tracing`.
pub fn connect(drive: &str) -> Result<DriveSession> {
    connect_with_config(drive, SessionConfig::default(), None)
}

/// Connect with explicit configuration and an optional event sink.
///
/// `drive` is an IP literal or host name. Fails if the local port is taken
/// or the drive address cannot be resolved.
pub fn connect_with_config(
    drive: &str,
    config: SessionConfig,
    sink: Option<Arc<dyn EventSink>>,
) -> Result<DriveSession> {
    let endpoint = UdpEndpoint::bind_connected(drive, config.local_port, config.remote_port)?;
    let sink: Arc<dyn EventSink> = match sink {
        Some(sink) => sink,
        None => Arc::new(TracingSink),
    };
    Ok(DriveSession::from_parts(endpoint, config, sink))
}

#[cfg(test)]
mod tests {
    use std::net::UdpSocket;
    use std::time::Duration;

    use ampdrive_transport::TransportError;

    use super::*;
    use crate::error::SessionError;

    #[test]
    fn connect_with_config_targets_drive_port() {
        let drive = UdpSocket::bind("127.0.0.1:0").expect("fake drive should bind");
        drive
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("timeout should apply");
        let port = drive.local_addr().expect("drive addr").port();

        let config = SessionConfig::default()
            .with_local_port(0)
            .with_remote_port(port);
        let session = connect_with_config("127.0.0.1", config, None).expect("should connect");
        assert_eq!(session.remote_addr().port(), port);
        assert!(!session.is_armed());

        session.send_command("SC").expect("send should succeed");
        let mut buf = [0u8; 16];
        let (n, _) = drive.recv_from(&mut buf).expect("drive should receive");
        assert_eq!(&buf[..n], &[0, 7, b'S', b'C', 13]);
    }

    #[test]
    fn connect_rejects_unresolvable_drive() {
        let config = SessionConfig::default().with_local_port(0);
        let err = connect_with_config("drive.invalid", config, None)
            .expect_err("resolution should fail");
        assert!(matches!(
            err,
            SessionError::Transport(TransportError::Resolve { .. })
        ));
    }
}
