//! UDP datagram listener
//!
//! Owns the socket binding for the live pipeline. Binding is fatal on
//! failure; once bound the listener is a passive source of datagram
//! payloads in arrival order.

use crate::types::{Result, TelemetryError};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Maximum UDP datagram size we'll receive.
const MAX_DATAGRAM_SIZE: usize = 65535;

/// Blocking UDP source of telemetry payloads
#[derive(Debug)]
pub struct DatagramListener {
    socket: UdpSocket,
    recv_buf: Vec<u8>,
}

impl DatagramListener {
    /// Bind the listener to a local address
    ///
    /// The live pipeline cannot run without this binding, so failure is
    /// surfaced as a fatal `Bind` error rather than falling back to
    /// another port.
    pub fn bind<A: ToSocketAddrs + std::fmt::Display>(addr: A) -> Result<Self> {
        let addr_str = addr.to_string();
        let socket = UdpSocket::bind(&addr).map_err(|source| TelemetryError::Bind {
            addr: addr_str.clone(),
            source,
        })?;
        log::info!("Listening for telemetry datagrams on {}", addr_str);

        Ok(Self {
            socket,
            recv_buf: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    /// Local address the socket is bound to
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Block until the next datagram arrives and return its payload
    pub fn recv(&mut self) -> std::io::Result<&[u8]> {
        let (len, _peer) = self.socket.recv_from(&mut self.recv_buf)?;
        Ok(&self.recv_buf[..len])
    }
}
