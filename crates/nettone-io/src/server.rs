//! UDP control listener.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nettone_synth::{Controller, MAX_COMMAND_LEN};
pub use nettone_synth::DEFAULT_CONTROL_PORT;

use crate::Result;

/// How often a blocked receive wakes to check the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Receives command datagrams and applies them to the voice bank.
///
/// Only the first [`MAX_COMMAND_LEN`] bytes of a datagram are read; the
/// rest is discarded by the socket.
pub struct ControlServer {
    socket: UdpSocket,
}

impl ControlServer {
    /// Bind a UDP socket on `addr`.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        Ok(Self { socket })
    }

    /// Address the socket is actually bound to (useful after binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive and apply one datagram.
    ///
    /// Returns `Ok(None)` when the poll interval passed with nothing to read.
    pub fn receive_one<const N: usize>(
        &self,
        controller: &Controller<N>,
    ) -> Result<Option<SocketAddr>> {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        match self.socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                if controller.handle_datagram(&buf[..len]).is_err() {
                    // Already counted and logged by the controller.
                }
                Ok(Some(from))
            }
            Err(e) if is_transient(e.kind()) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Serve until `running` is cleared. Returns the number of datagrams
    /// received.
    pub fn serve<const N: usize>(
        &self,
        controller: &Controller<N>,
        running: &AtomicBool,
    ) -> Result<u64> {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "control listener started");

        let mut received = 0u64;
        while running.load(Ordering::Relaxed) {
            if let Some(from) = self.receive_one(controller)? {
                received += 1;
                tracing::trace!(%from, received, "datagram");
            }
        }

        tracing::info!(received, "control listener stopped");
        Ok(received)
    }
}

/// Errors that mean "try again" rather than "the socket is broken".
fn is_transient(kind: ErrorKind) -> bool {
    // ConnectionReset shows up on Windows after an ICMP port-unreachable.
    matches!(
        kind,
        ErrorKind::WouldBlock
            | ErrorKind::TimedOut
            | ErrorKind::Interrupted
            | ErrorKind::ConnectionReset
    )
}
