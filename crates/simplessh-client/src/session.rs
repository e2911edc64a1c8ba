//! SSH session lifecycle: connect, handshake, authenticate, tear down.
//!
//! A [`Session`] owns one connected socket and one protocol context. It only
//! exists in the handshake-complete state from the caller's point of view;
//! a failed handshake tears the connection down before the error returns.
//! Dropping a session (or calling [`Session::close`]) disconnects it exactly
//! once.

use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use simplessh_core::{Protocol, SshError, SshResult, Step, StepError};

use crate::config::SessionConfig;
use crate::connector;
use crate::transport::Ssh2Protocol;
use crate::waiter;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Socket connected, handshake not yet complete.
    Connected,
    /// Handshake complete; authentication and channels may be used.
    HandshakeComplete,
    /// Disconnected; the socket and protocol context are released.
    Closed,
}

/// One SSH connection over a single socket.
///
/// Channel operations take `&mut self`, so at most one channel is live at a
/// time. Callers must authenticate successfully before using channels.
pub struct Session<P: Protocol = Ssh2Protocol> {
    socket: TcpStream,
    protocol: P,
    state: SessionState,
    wait_timeout: Duration,
    chunk_size: usize,
}

impl Session<Ssh2Protocol> {
    /// Connect to `host:port` and complete the handshake using libssh2.
    pub fn open(host: &str, port: u16, config: &SessionConfig) -> SshResult<Self> {
        let socket = connector::connect(host, port, config.connect_timeout())?;

        let protocol = Ssh2Protocol::new(&socket).map_err(|e| {
            warn!(kind = SshError::Init.kind_name(), error = %e, "failed to initialise libssh2 session");
            SshError::Init
        })?;

        Self::establish(socket, protocol, config)
    }
}

impl<P: Protocol> Session<P> {
    /// Drive the handshake for an already connected socket.
    ///
    /// The handshake step is retried immediately while it would block. On
    /// failure the session is torn down before [`SshError::Handshake`] is
    /// returned.
    pub fn establish(socket: TcpStream, protocol: P, config: &SessionConfig) -> SshResult<Self> {
        let mut session = Self {
            socket,
            protocol,
            state: SessionState::Connected,
            wait_timeout: config.wait_timeout(),
            chunk_size: config.effective_chunk_size(),
        };
        session.protocol.set_timeout(config.protocol_timeout_ms());

        if let Err(cause) = spin(|| session.protocol.handshake()) {
            warn!(kind = SshError::Handshake.kind_name(), %cause, "handshake failed");
            return Err(SshError::Handshake);
        }
        session.state = SessionState::HandshakeComplete;

        match session.host_key_fingerprint() {
            Some(fp) => debug!(fingerprint = %fp, "handshake complete"),
            None => debug!("handshake complete"),
        }
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Hex-encoded host key hash reported by the protocol layer.
    pub fn host_key_fingerprint(&self) -> Option<String> {
        self.protocol.host_key_fingerprint().map(hex::encode)
    }

    /// Authenticate with a password.
    ///
    /// A failure leaves the session open so another attempt can be made.
    pub fn authenticate_with_password(
        &mut self,
        username: &str,
        password: &str,
    ) -> SshResult<&mut Self> {
        let result = spin(|| self.protocol.auth_password(username, password));
        self.finish_auth(result, username, "password")
    }

    /// Authenticate with a key pair stored in files.
    pub fn authenticate_with_key(
        &mut self,
        username: &str,
        public_key: Option<&Path>,
        private_key: &Path,
        passphrase: Option<&str>,
    ) -> SshResult<&mut Self> {
        let result =
            spin(|| self.protocol.auth_key_file(username, public_key, private_key, passphrase));
        self.finish_auth(result, username, "publickey-file")
    }

    /// Authenticate with key material held in memory.
    pub fn authenticate_with_key_memory(
        &mut self,
        username: &str,
        public_key: Option<&[u8]>,
        private_key: &[u8],
        passphrase: Option<&str>,
    ) -> SshResult<&mut Self> {
        let result = spin(|| {
            self.protocol
                .auth_key_memory(username, public_key, private_key, passphrase)
        });
        self.finish_auth(result, username, "publickey-memory")
    }

    fn finish_auth(
        &mut self,
        result: Result<(), String>,
        username: &str,
        method: &str,
    ) -> SshResult<&mut Self> {
        match result {
            Ok(()) => {
                info!(username, method, "authenticated");
                Ok(self)
            }
            Err(cause) => {
                warn!(kind = SshError::Authentication.kind_name(), username, method, %cause, "authentication rejected");
                Err(SshError::Authentication)
            }
        }
    }

    /// Disconnect and release the socket and protocol context.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Err(e) = self.protocol.disconnect("session closed") {
            debug!(error = %e, "disconnect was not delivered");
        }
        self.state = SessionState::Closed;
        debug!("session closed");
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Wait for the socket in whatever directions the protocol is blocked on.
    pub(crate) fn wait(&self) {
        let directions = self.protocol.block_directions();
        match waiter::wait_socket(&self.socket, directions, self.wait_timeout) {
            Ok(ready) => trace!(?directions, ready, "readiness wait returned"),
            Err(e) => debug!(?directions, error = %e, "readiness wait failed"),
        }
    }

    /// Run a protocol-level operation, waiting for readiness while it would block.
    pub(crate) fn until_ready<T>(
        &mut self,
        mut op: impl FnMut(&mut P) -> Step<T>,
    ) -> Result<T, String> {
        loop {
            match op(&mut self.protocol) {
                Ok(value) => return Ok(value),
                Err(StepError::WouldBlock) => self.wait(),
                Err(StepError::Fatal(cause)) => return Err(cause),
            }
        }
    }
}

impl<P: Protocol> Drop for Session<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Retry `op` immediately for as long as it would block.
pub(crate) fn spin<T>(mut op: impl FnMut() -> Step<T>) -> Result<T, String> {
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(StepError::WouldBlock) => std::hint::spin_loop(),
            Err(StepError::Fatal(cause)) => return Err(cause),
        }
    }
}

/// Open a session, run `f`, and always close the session afterwards.
///
/// `f` may return any error type that an [`SshError`] converts into, so
/// callers can attach their own context.
pub fn with_session<T, E: From<SshError>>(
    host: &str,
    port: u16,
    config: &SessionConfig,
    f: impl FnOnce(&mut Session) -> Result<T, E>,
) -> Result<T, E> {
    let mut session = Session::open(host, port, config)?;
    let result = f(&mut session);
    session.close();
    result
}
