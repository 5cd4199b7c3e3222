use crate::core_transfer::TransferError;
use log::{debug, warn};
use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout_at, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Active,
    Passive,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Active => f.write_str("active"),
            TransferMode::Passive => f.write_str("passive"),
        }
    }
}

/// A data connection negotiated by PASV/EPSV or PORT/EPRT but not yet open.
///
/// Exactly one data command consumes it.
#[derive(Debug)]
pub enum DataChannel {
    Passive(TcpListener),
    Active(SocketAddr),
}

impl DataChannel {
    pub fn mode(&self) -> TransferMode {
        match self {
            DataChannel::Passive(_) => TransferMode::Passive,
            DataChannel::Active(_) => TransferMode::Active,
        }
    }

    /// Opens the connection, waiting at most `limit`.
    ///
    /// In passive mode, connections from any host other than `client_ip`
    /// are dropped and the wait continues.
    pub async fn establish(
        self,
        client_ip: IpAddr,
        limit: Duration,
    ) -> Result<TcpStream, TransferError> {
        let deadline = Instant::now() + limit;
        match self {
            DataChannel::Passive(listener) => loop {
                let (stream, peer) = match timeout_at(deadline, listener.accept()).await {
                    Ok(Ok(accepted)) => accepted,
                    Ok(Err(e)) => return Err(TransferError::CantOpen(e)),
                    Err(_) => return Err(TransferError::CantOpen(timed_out())),
                };
                if peer.ip() == client_ip {
                    debug!("Accepted data connection from {}", peer);
                    return Ok(stream);
                }
                warn!(
                    "Rejected data connection from foreign address {} (expected {})",
                    peer, client_ip
                );
            },
            DataChannel::Active(addr) => {
                match timeout_at(deadline, TcpStream::connect(addr)).await {
                    Ok(Ok(stream)) => {
                        debug!("Connected data channel to {}", addr);
                        Ok(stream)
                    }
                    Ok(Err(e)) => Err(TransferError::CantOpen(e)),
                    Err(_) => Err(TransferError::CantOpen(timed_out())),
                }
            }
        }
    }
}

fn timed_out() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "data connection timed out")
}
