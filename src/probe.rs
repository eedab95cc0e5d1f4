use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time;

use crate::types::PortOutcome;

/// Transport capability for one connection attempt.
///
/// The engine dispatches every probe through this seam, so a deterministic
/// transport can stand in for the network under test; [`TcpProbe`] is the
/// real one.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Attempt a connection to `addr` and classify how it ended. Must not
    /// block past `timeout` and must release any socket on every exit path.
    async fn probe(&self, addr: SocketAddr, timeout: Duration) -> PortOutcome;
}

/// Plain TCP connect probe. Nothing is read or written on a successful
/// connect; the stream is closed as soon as it is classified, before any
/// observer hears about it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProbe;

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, addr: SocketAddr, timeout: Duration) -> PortOutcome {
        match time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortOutcome::Open
            }
            Ok(Err(err)) if err.kind() == io::ErrorKind::ConnectionRefused => PortOutcome::Refused,
            // No affirmative refusal arrived (unreachable network, or the
            // timeout itself): the timeout flavor of closed.
            Ok(Err(_)) | Err(_) => PortOutcome::TimedOut,
        }
    }
}
