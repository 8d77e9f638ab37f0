mod receiver;
mod sender;

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::lookup_host;

pub use receiver::Receiver;
pub use sender::Sender;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no ipv4 address found for {0:?}")]
    AddressNotFound(String),
}

/// Resolves an `host:port` string to an ipv4 endpoint.
///
/// Note that only IPV4 is supported. A name that resolves exclusively
/// to ipv6 addresses is treated the same as a name that does not
/// resolve at all.
pub(crate) async fn resolve(address: &str) -> Result<(Ipv4Addr, u16), Error> {
    let addr = lookup_host(address)
        .await?
        .find_map(|it| match it {
            SocketAddr::V4(addr) => Some(addr),
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| Error::AddressNotFound(address.to_string()))?;

    Ok((*addr.ip(), addr.port()))
}
