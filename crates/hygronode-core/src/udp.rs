//! UDP multicast transport.
//!
//! On a host there is no radio to power, so "awake" is a flag and
//! "associated" means a bound socket. Dropping the socket is the host
//! equivalent of putting the radio to sleep.

use std::net::{SocketAddr, SocketAddrV4};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use crate::config::NodeConfig;
use crate::error::{Error, Result};
use crate::traits::NetworkTransport;

/// Sends datagrams over a tokio UDP socket.
#[derive(Debug)]
pub struct UdpMulticastTransport {
    bind_addr: SocketAddrV4,
    ttl: u32,
    awake: bool,
    socket: Option<UdpSocket>,
}

impl UdpMulticastTransport {
    /// Create a transport bound to the configured interface on demand.
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            bind_addr: SocketAddrV4::new(config.interface, 0),
            ttl: config.multicast_ttl,
            awake: false,
            socket: None,
        }
    }

    /// Whether a socket is bound.
    pub fn is_associated(&self) -> bool {
        self.socket.is_some()
    }

    /// Local address of the socket, while associated.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

#[async_trait]
impl NetworkTransport for UdpMulticastTransport {
    async fn wake(&mut self) -> Result<()> {
        trace!("radio wake");
        self.awake = true;
        Ok(())
    }

    async fn associate(&mut self) -> Result<()> {
        if !self.awake {
            return Err(Error::transport("associate", "radio is asleep"));
        }
        if self.socket.is_some() {
            return Ok(());
        }

        let socket = UdpSocket::bind(self.bind_addr)
            .await
            .map_err(|e| Error::transport("bind", e.to_string()))?;
        socket
            .set_multicast_ttl_v4(self.ttl)
            .map_err(|e| Error::transport("set_multicast_ttl", e.to_string()))?;

        debug!(local = ?socket.local_addr().ok(), ttl = self.ttl, "socket ready");
        self.socket = Some(socket);
        Ok(())
    }

    async fn send_datagram(&mut self, target: SocketAddr, payload: &[u8]) -> Result<()> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(Error::transport("send", "not associated"));
        };

        let written = socket
            .send_to(payload, target)
            .await
            .map_err(|e| Error::transport("send", e.to_string()))?;
        if written != payload.len() {
            return Err(Error::transport(
                "send",
                format!("short write: {} of {} bytes", written, payload.len()),
            ));
        }

        trace!(%target, bytes = written, "datagram sent");
        Ok(())
    }

    async fn sleep(&mut self) -> Result<()> {
        trace!("radio sleep");
        self.socket = None;
        self.awake = false;
        Ok(())
    }
}
