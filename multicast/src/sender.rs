use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::{resolve, Error};

/// A connected datagram socket targeting a multicast group.
///
/// Every payload written is delivered to all members of the group,
/// including this host while multicast loopback is enabled. Note that
/// there may be packet loss.
pub struct Sender {
    socket: UdpSocket,
}

impl Sender {
    /// Creates a UDP socket on an ephemeral local port connected to
    /// the multicast group endpoint.
    ///
    /// Note that only IPV4 is supported.
    pub async fn new(address: &str) -> Result<Self, Error> {
        let (group, port) = resolve(address).await?;

        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
        socket.set_multicast_loop_v4(true)?;
        socket.connect((group, port)).await?;

        Ok(Self { socket })
    }

    /// Sends one datagram to the group.
    pub async fn send(&self, payload: &[u8]) -> Result<(), Error> {
        self.socket.send(payload).await?;
        Ok(())
    }
}
