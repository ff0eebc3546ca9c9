//! UDP control sender.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use nettone_synth::{Command, MAX_COMMAND_LEN};

use crate::{Error, Result};

/// Sends command datagrams to a running synth.
pub struct ControlClient {
    socket: UdpSocket,
    target: SocketAddr,
}

impl ControlClient {
    /// Resolve `target` and open an ephemeral socket of the same family.
    pub fn connect<A: ToSocketAddrs>(target: A) -> Result<Self> {
        let target = target
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::Resolve("no addresses".to_string()))?;
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(target)?;
        Ok(Self { socket, target })
    }

    /// Where datagrams go.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Send one command in wire form.
    pub fn send(&self, command: &Command) -> Result<()> {
        self.send_raw(command.to_string().as_bytes())
    }

    /// Send a payload verbatim. Payloads the synth would truncate are refused.
    pub fn send_raw(&self, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_COMMAND_LEN {
            return Err(Error::CommandTooLong {
                len: payload.len(),
                max: MAX_COMMAND_LEN,
            });
        }
        self.socket.send(payload)?;
        tracing::debug!(to = %self.target, payload = %String::from_utf8_lossy(payload), "sent");
        Ok(())
    }

    /// Silence voices `0..voices`.
    pub fn reset(&self, voices: usize) -> Result<()> {
        for voice in 0..voices {
            self.send(&Command::silence(voice))?;
        }
        Ok(())
    }
}
