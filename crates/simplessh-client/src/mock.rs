//! Scripted protocol implementation for driving the engine in tests.
//!
//! Each operation pops its next result from a queue; an empty queue means
//! success (or end of data for reads). Probes stay readable after the mock
//! is moved into a session or dropped.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use simplessh_core::{BlockDirections, Protocol, ProtocolChannel, Step};

/// Connected loopback socket pair; keep the server half alive for the test.
pub(crate) fn loopback_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

fn next(queue: &mut VecDeque<Step<()>>) -> Step<()> {
    queue.pop_front().unwrap_or(Ok(()))
}

#[derive(Default)]
struct ProtocolLog {
    calls: Vec<String>,
    timeout_ms: Option<u32>,
    scp: Option<(PathBuf, i32, u64)>,
    dropped: bool,
}

#[derive(Clone, Default)]
pub(crate) struct ProtocolProbe(Rc<RefCell<ProtocolLog>>);

impl ProtocolProbe {
    fn record(&self, call: &str) {
        self.0.borrow_mut().calls.push(call.to_string());
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.borrow().calls.iter().filter(|c| *c == call).count()
    }

    pub fn timeout_ms(&self) -> Option<u32> {
        self.0.borrow().timeout_ms
    }

    pub fn scp(&self) -> Option<(PathBuf, i32, u64)> {
        self.0.borrow().scp.clone()
    }

    pub fn dropped(&self) -> bool {
        self.0.borrow().dropped
    }
}

pub(crate) struct MockProtocol {
    pub handshake: VecDeque<Step<()>>,
    pub auth: VecDeque<Step<()>>,
    pub open: VecDeque<Step<()>>,
    pub channels: VecDeque<MockChannel>,
    pub directions: BlockDirections,
    pub fingerprint: Option<Vec<u8>>,
    pub disconnect: Step<()>,
    probe: ProtocolProbe,
}

impl MockProtocol {
    pub fn new() -> Self {
        Self {
            handshake: VecDeque::new(),
            auth: VecDeque::new(),
            open: VecDeque::new(),
            channels: VecDeque::new(),
            directions: BlockDirections::Outbound,
            fingerprint: None,
            disconnect: Ok(()),
            probe: ProtocolProbe::default(),
        }
    }

    pub fn probe(&self) -> ProtocolProbe {
        self.probe.clone()
    }

    fn open_channel(&mut self) -> Step<MockChannel> {
        next(&mut self.open)?;
        Ok(self.channels.pop_front().unwrap_or_default())
    }
}

impl Protocol for MockProtocol {
    type Channel = MockChannel;

    fn handshake(&mut self) -> Step<()> {
        self.probe.record("handshake");
        next(&mut self.handshake)
    }

    fn set_timeout(&mut self, timeout_ms: u32) {
        self.probe.0.borrow_mut().timeout_ms = Some(timeout_ms);
    }

    fn auth_password(&mut self, _username: &str, _password: &str) -> Step<()> {
        self.probe.record("auth_password");
        next(&mut self.auth)
    }

    fn auth_key_file(
        &mut self,
        _username: &str,
        _public_key: Option<&Path>,
        _private_key: &Path,
        _passphrase: Option<&str>,
    ) -> Step<()> {
        self.probe.record("auth_key_file");
        next(&mut self.auth)
    }

    fn auth_key_memory(
        &mut self,
        _username: &str,
        _public_key: Option<&[u8]>,
        _private_key: &[u8],
        _passphrase: Option<&str>,
    ) -> Step<()> {
        self.probe.record("auth_key_memory");
        next(&mut self.auth)
    }

    fn open_session_channel(&mut self) -> Step<MockChannel> {
        self.probe.record("open_session_channel");
        self.open_channel()
    }

    fn open_scp_send(&mut self, path: &Path, mode: i32, size: u64) -> Step<MockChannel> {
        self.probe.record("open_scp_send");
        self.probe.0.borrow_mut().scp = Some((path.to_path_buf(), mode, size));
        self.open_channel()
    }

    fn block_directions(&self) -> BlockDirections {
        self.directions
    }

    fn host_key_fingerprint(&self) -> Option<Vec<u8>> {
        self.fingerprint.clone()
    }

    fn disconnect(&mut self, _description: &str) -> Step<()> {
        self.probe.record("disconnect");
        self.disconnect.clone()
    }
}

impl Drop for MockProtocol {
    fn drop(&mut self) {
        self.probe.0.borrow_mut().dropped = true;
    }
}

#[derive(Default)]
struct ChannelLog {
    command: Option<String>,
    offered: Vec<usize>,
    written: Vec<u8>,
    eof_sent: bool,
    closed: bool,
    freed: bool,
}

#[derive(Clone, Default)]
pub(crate) struct ChannelProbe(Rc<RefCell<ChannelLog>>);

impl ChannelProbe {
    pub fn command(&self) -> Option<String> {
        self.0.borrow().command.clone()
    }

    /// Slice length passed to each write call.
    pub fn offered(&self) -> Vec<usize> {
        self.0.borrow().offered.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.0.borrow().written.clone()
    }

    pub fn eof_sent(&self) -> bool {
        self.0.borrow().eof_sent
    }

    pub fn closed(&self) -> bool {
        self.0.borrow().closed
    }

    pub fn freed(&self) -> bool {
        self.0.borrow().freed
    }
}

#[derive(Default)]
pub(crate) struct MockChannel {
    pub exec: VecDeque<Step<()>>,
    pub stdout: VecDeque<Step<Vec<u8>>>,
    pub stderr: VecDeque<Step<Vec<u8>>>,
    /// `Ok(n)` accepts at most n bytes; an empty queue accepts everything.
    pub writes: VecDeque<Step<usize>>,
    pub eof: VecDeque<Step<()>>,
    pub close: VecDeque<Step<()>>,
    pub exit_status: Option<i32>,
    pub exit_signal: Option<String>,
    probe: ChannelProbe,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> ChannelProbe {
        self.probe.clone()
    }
}

fn read_from(queue: &mut VecDeque<Step<Vec<u8>>>, buf: &mut [u8]) -> Step<usize> {
    match queue.pop_front() {
        None => Ok(0),
        Some(Err(e)) => Err(e),
        Some(Ok(mut bytes)) => {
            let n = bytes.len().min(buf.len());
            buf[..n].copy_from_slice(&bytes[..n]);
            if n < bytes.len() {
                queue.push_front(Ok(bytes.split_off(n)));
            }
            Ok(n)
        }
    }
}

impl ProtocolChannel for MockChannel {
    fn exec(&mut self, command: &str) -> Step<()> {
        next(&mut self.exec)?;
        self.probe.0.borrow_mut().command = Some(command.to_string());
        Ok(())
    }

    fn read_stdout(&mut self, buf: &mut [u8]) -> Step<usize> {
        read_from(&mut self.stdout, buf)
    }

    fn read_stderr(&mut self, buf: &mut [u8]) -> Step<usize> {
        read_from(&mut self.stderr, buf)
    }

    fn write(&mut self, data: &[u8]) -> Step<usize> {
        let mut log = self.probe.0.borrow_mut();
        log.offered.push(data.len());
        let accepted = match self.writes.pop_front() {
            None => data.len(),
            Some(Ok(limit)) => limit.min(data.len()),
            Some(Err(e)) => return Err(e),
        };
        log.written.extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    fn send_eof(&mut self) -> Step<()> {
        next(&mut self.eof)?;
        self.probe.0.borrow_mut().eof_sent = true;
        Ok(())
    }

    fn close(&mut self) -> Step<()> {
        next(&mut self.close)?;
        self.probe.0.borrow_mut().closed = true;
        Ok(())
    }

    fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }

    fn exit_signal(&self) -> Option<String> {
        self.exit_signal.clone()
    }
}

impl Drop for MockChannel {
    fn drop(&mut self) {
        self.probe.0.borrow_mut().freed = true;
    }
}
