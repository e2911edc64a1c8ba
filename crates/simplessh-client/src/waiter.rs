//! Readiness waiting on the session socket.
//!
//! This is the only place the engine suspends. Callers retry the protocol
//! operation that reported would-block once the wait returns, whether the
//! socket became ready or the timeout elapsed.

use std::io;
use std::os::fd::AsFd;
use std::time::Duration;

use rustix::event::{PollFd, PollFlags, Timespec};
use rustix::io::Errno;

use simplessh_core::BlockDirections;

/// Poll a single descriptor for `events`.
///
/// Returns `Ok(None)` on timeout, otherwise the returned event mask.
pub(crate) fn poll_fd<Fd: AsFd>(
    fd: &Fd,
    events: PollFlags,
    timeout: Duration,
) -> io::Result<Option<PollFlags>> {
    let timeout = Timespec {
        tv_sec: i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX),
        tv_nsec: timeout.subsec_nanos().into(),
    };
    let mut fds = [PollFd::new(fd, events)];

    match rustix::event::poll(&mut fds, Some(&timeout))? {
        0 => Ok(None),
        _ => Ok(Some(fds[0].revents())),
    }
}

/// Block until `socket` is ready in the given directions or `timeout` elapses.
///
/// Returns whether the socket reported readiness. An interrupted wait counts
/// as a spurious wake-up. With no direction hint the wait is for input.
pub fn wait_socket<S: AsFd>(
    socket: &S,
    directions: BlockDirections,
    timeout: Duration,
) -> io::Result<bool> {
    let mut events = PollFlags::empty();
    if directions.wants_read() {
        events |= PollFlags::IN;
    }
    if directions.wants_write() {
        events |= PollFlags::OUT;
    }
    if events.is_empty() {
        events = PollFlags::IN;
    }

    match poll_fd(socket, events, timeout) {
        Ok(ready) => Ok(ready.is_some()),
        Err(e) if Errno::from_io_error(&e) == Some(Errno::INTR) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::time::Instant;

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn writable_socket_is_ready_immediately() {
        let (client, _server) = loopback_pair();
        let start = Instant::now();
        let ready =
            wait_socket(&client, BlockDirections::Outbound, Duration::from_secs(5)).unwrap();
        assert!(ready);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn idle_socket_times_out_for_input() {
        let (client, _server) = loopback_pair();
        let start = Instant::now();
        let ready =
            wait_socket(&client, BlockDirections::Inbound, Duration::from_millis(50)).unwrap();
        assert!(!ready);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn pending_input_wakes_reader() {
        let (client, mut server) = loopback_pair();
        server.write_all(b"SSH-2.0-test\r\n").unwrap();
        let ready =
            wait_socket(&client, BlockDirections::Inbound, Duration::from_secs(5)).unwrap();
        assert!(ready);
    }

    #[test]
    fn both_directions_ready_when_writable() {
        let (client, _server) = loopback_pair();
        let ready = wait_socket(&client, BlockDirections::Both, Duration::from_secs(5)).unwrap();
        assert!(ready);
    }

    #[test]
    fn no_hint_waits_for_input() {
        let (client, _server) = loopback_pair();
        let ready =
            wait_socket(&client, BlockDirections::None, Duration::from_millis(20)).unwrap();
        assert!(!ready);
    }

    #[test]
    fn poll_reports_input_event() {
        let (client, mut server) = loopback_pair();
        server.write_all(b"x").unwrap();
        let revents = poll_fd(&client, PollFlags::IN, Duration::from_secs(5))
            .unwrap()
            .unwrap();
        assert!(revents.contains(PollFlags::IN));
    }
}
