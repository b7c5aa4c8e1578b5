//! Wake-on-lan / sleep-on-lan client
//!
//! Wakes the target machine with a standard magic packet and puts it to
//! sleep with the sleep-on-lan convention: the same packet built from the
//! MAC address reversed, picked up by a sleep-on-lan listener on the target.

use tokio::net::UdpSocket;

use crate::config::WakeOnLanConfig;
use crate::{Error, Result};

/// Wake-on-lan sender for one configured target machine
pub struct WolClient {
    mac: [u8; 6],
    broadcast: String,
}

impl WolClient {
    /// Create a sender for the configured target
    ///
    /// An unparseable MAC is caught later by [`Self::wake`] rather than at
    /// construction so startup never fails on a dormant feature.
    #[must_use]
    pub fn new(config: &WakeOnLanConfig) -> Self {
        Self {
            mac: parse_mac(&config.mac).unwrap_or([0; 6]),
            broadcast: config.broadcast.clone(),
        }
    }

    /// Send the wake magic packet
    ///
    /// # Errors
    ///
    /// Returns [`Error::WakeOnLan`] when the MAC is invalid or the packet
    /// cannot be sent.
    pub async fn wake(&self) -> Result<()> {
        self.send(self.mac).await?;
        tracing::info!(target = %format_mac(self.mac), "sent wake packet");
        Ok(())
    }

    /// Send the sleep packet (magic packet for the reversed MAC)
    ///
    /// # Errors
    ///
    /// Returns [`Error::WakeOnLan`] when the packet cannot be sent.
    pub async fn sleep(&self) -> Result<()> {
        let mut reversed = self.mac;
        reversed.reverse();
        self.send(reversed).await?;
        tracing::info!(target = %format_mac(self.mac), "sent sleep packet");
        Ok(())
    }

    async fn send(&self, mac: [u8; 6]) -> Result<()> {
        if mac == [0; 6] {
            return Err(Error::WakeOnLan("no valid MAC address configured".into()));
        }

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.set_broadcast(true)?;
        socket
            .send_to(&magic_packet(mac), &self.broadcast)
            .await
            .map_err(|e| Error::WakeOnLan(format!("send to {} failed: {e}", self.broadcast)))?;
        Ok(())
    }
}

/// Standard magic packet: six 0xFF bytes then the MAC sixteen times
fn magic_packet(mac: [u8; 6]) -> [u8; 102] {
    let mut packet = [0xFF_u8; 102];
    for repeat in 0..16 {
        packet[6 + repeat * 6..12 + repeat * 6].copy_from_slice(&mac);
    }
    packet
}

/// Parse `AA:BB:CC:DD:EE:FF` (also accepts `-` separators)
fn parse_mac(raw: &str) -> Option<[u8; 6]> {
    let mut mac = [0_u8; 6];
    let mut parts = raw.split(|c| c == ':' || c == '-');
    for byte in &mut mac {
        *byte = u8::from_str_radix(parts.next()?, 16).ok()?;
    }
    parts.next().is_none().then_some(mac)
}

fn format_mac(mac: [u8; 6]) -> String {
    mac.map(|b| format!("{b:02X}")).join(":")
}
