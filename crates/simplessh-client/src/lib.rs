//! simplessh-client: a small, non-blocking SSH client engine.
//!
//! Connects a single socket with a bounded connect timeout, drives the
//! protocol handshake, authenticates, runs commands capturing stdout, stderr
//! and exit status, and uploads byte payloads SCP-style. Every protocol
//! operation that would block is retried, either immediately or after a
//! bounded readiness wait on the socket.
//!
//! # Quick Start
//!
//! ```no_run
//! use simplessh_client::{Session, SessionConfig};
//!
//! # fn example() -> simplessh_client::SshResult<()> {
//! let mut session = Session::open("example.com", 22, &SessionConfig::default())?;
//! session.authenticate_with_password("alice", "hunter2")?;
//!
//! let output = session.exec("uname -a")?;
//! println!("{} (exit {})", output.stdout_lossy(), output.exit_code);
//!
//! let sent = session.send_file(0o644, b"hello\n", "/tmp/hello.txt")?;
//! assert_eq!(sent, 6);
//!
//! session.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod exec;
pub mod file_transfer;
pub mod session;
pub mod transport;
pub mod waiter;

#[cfg(test)]
pub(crate) mod mock;

// Re-export primary public types.
pub use config::{ConfigError, SessionConfig};
pub use session::{with_session, Session, SessionState};
pub use transport::{Ssh2Channel, Ssh2Protocol};

// Re-export simplessh-core types for convenience.
pub use simplessh_core::{ExecOutput, SshError, SshResult, EXIT_CODE_UNKNOWN};
