use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

use tracing::info;

use crate::config::TransportConfig;
use crate::device::Device;
use crate::error::TransportError;

/// One datagram = one token. Payloads longer than `max_datagram` are truncated.
#[derive(Debug)]
pub struct UdpDevice {
    socket: UdpSocket,
    buf: Vec<u8>,
    id: String,
}

impl UdpDevice {
    pub fn bind(config: &TransportConfig) -> Result<Self, TransportError> {
        let addr = config.bind;
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket
            .set_read_timeout(Some(config.read_timeout()))
            .map_err(TransportError::Recv)?;
        let local = socket.local_addr().unwrap_or(addr);
        info!(%local, "listening for tokens");
        Ok(Self {
            socket,
            buf: vec![0; config.max_datagram.max(1)],
            id: format!("udp:{local}"),
        })
    }

    /// Address actually bound, useful when the config asked for port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.socket.local_addr().map_err(TransportError::Recv)
    }
}

impl Device for UdpDevice {
    fn next_token(&mut self) -> Result<Option<String>, TransportError> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, _from)) => Ok(Some(
                String::from_utf8_lossy(&self.buf[..len]).trim().to_string(),
            )),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(TransportError::Recv(e)),
        }
    }

    fn name(&self) -> &str {
        "UDP token socket"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
