//! The transport adapter: the channel driver's only dependency on an
//! actual socket. Kept as a trait so the driver and its tests never
//! need a bound UDP socket.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::ChannelError;

pub trait Transport {
    fn send(&self, remote: SocketAddr, bytes: &[u8]) -> Result<(), ChannelError>;

    /// Non-blocking-ish receive: returns `Ok(None)` on a read timeout
    /// (the polling interval), `Ok(Some(n))` with `buffer[..n]` filled
    /// on a datagram, or `Err` on a genuine socket error.
    fn recv(&self, buffer: &mut [u8]) -> Result<Option<usize>, ChannelError>;
}

/// A bound UDP socket with a short read timeout, used to emulate the
/// original `select()`-driven poll loop without an async runtime: the
/// main loop alternates between `recv` (returns promptly on timeout)
/// and draining the stdin channel.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    pub fn bind(local_port: u16, poll_interval: Duration) -> Result<Self, ChannelError> {
        let socket = UdpSocket::bind(("0.0.0.0", local_port))
            .map_err(|e| ChannelError::TransportError(format!("bind: {}", e)))?;
        socket
            .set_read_timeout(Some(poll_interval))
            .map_err(|e| ChannelError::TransportError(format!("set_read_timeout: {}", e)))?;
        Ok(Self { socket })
    }
}

impl Transport for UdpTransport {
    fn send(&self, remote: SocketAddr, bytes: &[u8]) -> Result<(), ChannelError> {
        self.socket
            .send_to(bytes, remote)
            .map(|_| ())
            .map_err(|e| ChannelError::TransportError(format!("send_to: {}", e)))
    }

    fn recv(&self, buffer: &mut [u8]) -> Result<Option<usize>, ChannelError> {
        match self.socket.recv_from(buffer) {
            Ok((n, _from)) => Ok(Some(n)),
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(ChannelError::TransportError(format!("recv_from: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_round_trip() {
        let a = UdpTransport::bind(0, Duration::from_millis(200)).unwrap();
        let b = UdpTransport::bind(0, Duration::from_millis(200)).unwrap();
        let a_addr = a.socket.local_addr().unwrap();
        let b_addr = b.socket.local_addr().unwrap();

        a.send(b_addr, b"ping").unwrap();
        let mut buf = [0u8; 16];
        let n = b.recv(&mut buf).unwrap().expect("datagram arrives within timeout");
        assert_eq!(&buf[..n], b"ping");

        b.send(a_addr, b"pong").unwrap();
        let n = a.recv(&mut buf).unwrap().expect("datagram arrives within timeout");
        assert_eq!(&buf[..n], b"pong");
    }

    #[test]
    fn recv_times_out_without_data() {
        let a = UdpTransport::bind(0, Duration::from_millis(50)).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(a.recv(&mut buf).unwrap(), None);
    }
}
