//! Capability traits for the wrapped SSH protocol implementation.
//!
//! The engine never touches handshake crypto or wire bytes. It drives an
//! implementation of these traits, each call of which either makes progress,
//! reports that it would block, or fails hard.

use std::path::Path;
use thiserror::Error;

/// Non-success outcome of a single non-blocking protocol step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// No progress is possible without further socket readiness.
    #[error("operation would block")]
    WouldBlock,

    /// The operation failed and retrying will not help.
    #[error("{0}")]
    Fatal(String),
}

impl StepError {
    pub fn is_would_block(&self) -> bool {
        matches!(self, StepError::WouldBlock)
    }
}

/// Result of one non-blocking protocol step.
pub type Step<T> = Result<T, StepError>;

/// Socket directions the protocol layer is currently blocked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDirections {
    None,
    Inbound,
    Outbound,
    Both,
}

impl BlockDirections {
    pub fn wants_read(self) -> bool {
        matches!(self, BlockDirections::Inbound | BlockDirections::Both)
    }

    pub fn wants_write(self) -> bool {
        matches!(self, BlockDirections::Outbound | BlockDirections::Both)
    }
}

/// One protocol connection layered over a single connected socket.
pub trait Protocol {
    /// Channel type produced by this connection. Dropping it frees it.
    type Channel: ProtocolChannel;

    /// Advance the key exchange. Returns `Ok(())` once it is complete.
    fn handshake(&mut self) -> Step<()>;

    /// Overall protocol timeout in milliseconds (0 disables it).
    fn set_timeout(&mut self, timeout_ms: u32);

    fn auth_password(&mut self, username: &str, password: &str) -> Step<()>;

    fn auth_key_file(
        &mut self,
        username: &str,
        public_key: Option<&Path>,
        private_key: &Path,
        passphrase: Option<&str>,
    ) -> Step<()>;

    fn auth_key_memory(
        &mut self,
        username: &str,
        public_key: Option<&[u8]>,
        private_key: &[u8],
        passphrase: Option<&str>,
    ) -> Step<()>;

    /// Open a session channel suitable for `exec`.
    fn open_session_channel(&mut self) -> Step<Self::Channel>;

    /// Open an SCP upload channel declaring `size` bytes up front.
    fn open_scp_send(&mut self, path: &Path, mode: i32, size: u64) -> Step<Self::Channel>;

    /// Directions the last would-block result was waiting on.
    ///
    /// Must be queried immediately before each readiness wait.
    fn block_directions(&self) -> BlockDirections;

    /// Hash of the server host key, once the handshake is complete.
    fn host_key_fingerprint(&self) -> Option<Vec<u8>>;

    /// Send a disconnect message carrying `description`.
    fn disconnect(&mut self, description: &str) -> Step<()>;
}

/// A logical channel multiplexed over a [`Protocol`] connection.
pub trait ProtocolChannel {
    fn exec(&mut self, command: &str) -> Step<()>;

    /// Read from the primary stream. `Ok(0)` means end of data.
    fn read_stdout(&mut self, buf: &mut [u8]) -> Step<usize>;

    /// Read from the extended (stderr) stream. `Ok(0)` means end of data.
    fn read_stderr(&mut self, buf: &mut [u8]) -> Step<usize>;

    /// Write part of `data`, returning how many bytes were accepted.
    fn write(&mut self, data: &[u8]) -> Step<usize>;

    fn send_eof(&mut self) -> Step<()>;

    fn close(&mut self) -> Step<()>;

    /// Exit status reported by the remote side, if any.
    fn exit_status(&self) -> Option<i32>;

    /// Name of the signal that terminated the remote process, if any.
    fn exit_signal(&self) -> Option<String>;
}
