//! Socket establishment with a per-address connect timeout.
//!
//! Every resolved address (both families) is tried in resolver order with a
//! non-blocking connect. The first socket to become readable within the
//! timeout wins and is returned in blocking mode.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use rustix::event::PollFlags;
use rustix::io::Errno;
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::{debug, warn};

use simplessh_core::{SshError, SshResult};

use crate::waiter::poll_fd;

/// Connect to `host:port`, bounding each candidate address by `timeout`.
pub fn connect(host: &str, port: u16, timeout: Duration) -> SshResult<TcpStream> {
    let candidates: Vec<SocketAddr> = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect(),
        Err(e) => {
            warn!(kind = SshError::Connect.kind_name(), host, port, error = %e, "address resolution failed");
            return Err(SshError::Connect);
        }
    };

    connect_addrs(&candidates, timeout).inspect_err(|e| {
        warn!(kind = e.kind_name(), host, port, "no resolved address accepted the connection");
    })
}

/// Try each address in order and return the first that connects.
///
/// A candidate that errors or times out is closed before the next is tried.
pub fn connect_addrs(candidates: &[SocketAddr], timeout: Duration) -> SshResult<TcpStream> {
    for &addr in candidates {
        match connect_candidate(addr, timeout) {
            Ok(stream) => {
                debug!(%addr, "connected");
                return Ok(stream);
            }
            Err(e) => debug!(%addr, error = %e, "candidate failed"),
        }
    }
    Err(SshError::Connect)
}

/// Attempt one address. The socket is closed on every error path by drop.
fn connect_candidate(addr: SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
    let socket = Socket::new(
        Domain::for_address(addr),
        Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;
    socket.set_nonblocking(true)?;

    match socket.connect(&SockAddr::from(addr)) {
        Ok(()) => {}
        Err(e) if Errno::from_io_error(&e) == Some(Errno::INPROGRESS) => {}
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
        Err(e) => return Err(e),
    }

    // The server speaks first, so readability is the "connected" signal.
    let revents = poll_fd(&socket, PollFlags::IN | PollFlags::PRI, timeout)?
        .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?;

    if let Some(e) = socket.take_error()? {
        return Err(e);
    }
    if !revents.intersects(PollFlags::IN | PollFlags::PRI) {
        return Err(io::Error::new(
            io::ErrorKind::NotConnected,
            "socket never became readable",
        ));
    }

    socket.set_nonblocking(false)?;
    Ok(socket.into())
}
