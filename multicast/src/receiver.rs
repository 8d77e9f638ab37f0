use std::net::{Ipv4Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::{resolve, Error};

/// A multicast group listener.
///
/// Joins the group on the default interface and reads every datagram
/// addressed to it. UDP multicast is unordered and unreliable; whatever
/// arrives on the group is handed to the caller as is, there is no
/// notion of a well formed message at this layer.
///
/// The group membership and the socket are released when the receiver
/// is dropped.
pub struct Receiver {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl Receiver {
    /// Creates a UDP socket bound to the group's port and joins the
    /// multicast group for receiving.
    ///
    /// `maxsz` is the maximum datagram size in bytes; larger datagrams
    /// are silently truncated by the transport. The same value is
    /// requested as the socket receive buffer size, best effort, the
    /// kernel may clamp or ignore it.
    ///
    /// Note that only IPV4 is supported.
    pub async fn new(address: &str, maxsz: usize) -> Result<Self, Error> {
        let (group, port) = resolve(address).await?;

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)).into())?;
        socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;

        // Best effort, a refusal only risks drops under load.
        let _ = socket.set_recv_buffer_size(maxsz);

        socket.set_nonblocking(true)?;
        let socket = UdpSocket::from_std(socket.into())?;

        log::info!("udp socket join: multicast={}, port={}", group, port);

        Ok(Self {
            socket,
            buffer: vec![0u8; maxsz],
        })
    }

    /// Reads datagrams from the group forever, invoking `handler` once
    /// per datagram with the sender address and the bytes received.
    ///
    /// The slice is only valid for the duration of the call, the buffer
    /// is reused for the next read. The handler runs synchronously on
    /// the receive loop and must not block, or datagrams will queue at
    /// the OS socket buffer and eventually be dropped.
    ///
    /// Returns on the first read error; there is no success path.
    pub async fn run<F>(mut self, mut handler: F) -> Result<(), Error>
    where
        F: FnMut(SocketAddr, &[u8]),
    {
        loop {
            let (size, source) = self.socket.recv_from(&mut self.buffer).await?;
            handler(source, &self.buffer[..size]);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{sync::mpsc, time::timeout};

    use super::*;
    use crate::Sender;

    #[tokio::test]
    async fn rejects_a_malformed_address() {
        assert!(Receiver::new("no port here", 2048).await.is_err());
    }

    #[tokio::test]
    async fn delivers_datagrams_to_the_handler() {
        let receiver = Receiver::new("224.0.0.224:41920", 2048).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(receiver.run(move |source, payload| {
            let _ = tx.send((source, payload.to_vec()));
        }));

        let sender = Sender::new("224.0.0.224:41920").await.unwrap();
        sender.send(b"peer-a\n").await.unwrap();

        let (_, payload) = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no datagram within two seconds")
            .unwrap();

        assert_eq!(payload, b"peer-a\n");
    }

    #[tokio::test]
    async fn truncates_datagrams_larger_than_maxsz() {
        let receiver = Receiver::new("224.0.0.225:41921", 4).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(receiver.run(move |_, payload| {
            let _ = tx.send(payload.to_vec());
        }));

        let sender = Sender::new("224.0.0.225:41921").await.unwrap();
        sender.send(b"abcdefgh\n").await.unwrap();

        let payload = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no datagram within two seconds")
            .unwrap();

        assert_eq!(payload, b"abcd");
    }
}
