// Loopback UDP transport
//
// Outbound datagrams go to the renderer's port; the renderer answers queries
// and pushes inbound commands to our bound port. One receive task per process.

use crate::ipc::{Message, MessageChannel, Transport, TransportError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Largest payload a single IPv4 UDP datagram can carry
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Datagram transport bound to a local loopback port
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Bind `local` and target `peer` for outbound datagrams.
    pub async fn bind(local: SocketAddr, peer: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        tracing::info!(
            "UDP transport bound on {} (renderer at {})",
            socket.local_addr()?,
            peer
        );
        Ok(Self {
            socket: Arc::new(socket),
            peer,
        })
    }

    pub fn socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpTransport {
    fn send_raw(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.len() > MAX_DATAGRAM_SIZE {
            return Err(TransportError::PayloadTooLarge(bytes.len()));
        }

        // Non-blocking: a full socket buffer drops the datagram (lossy channel)
        self.socket.try_send_to(bytes, self.peer)?;
        Ok(())
    }
}

/// Spawn the receive loop for `socket`.
///
/// Query responses are handed to `channel`; inbound commands are forwarded to
/// `inbound_tx` for the settings context. The task ends when the inbound
/// receiver is dropped or the task is aborted.
pub fn spawn_receiver(
    socket: Arc<UdpSocket>,
    channel: Arc<MessageChannel>,
    inbound_tx: mpsc::UnboundedSender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!("UDP receive loop started");
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        loop {
            let (len, from) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    // ICMP port-unreachable surfaces here on some platforms
                    // while the renderer is not running yet
                    tracing::debug!("UDP receive failed: {}", e);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };

            let text = match std::str::from_utf8(&buf[..len]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Dropping non UTF-8 datagram from {}: {}", from, e);
                    continue;
                }
            };

            if let Some(message) = channel.route_inbound(text) {
                if inbound_tx.send(message).is_err() {
                    tracing::debug!("Inbound queue closed, stopping UDP receive loop");
                    break;
                }
            }
        }
    })
}
