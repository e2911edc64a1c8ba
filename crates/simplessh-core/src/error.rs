use thiserror::Error;

/// Errors produced by the simplessh engine.
///
/// Every fallible step classifies its failure into exactly one of these
/// kinds where it is detected. The underlying cause is logged at that point
/// and not carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SshError {
    #[error("could not connect to any resolved address")]
    Connect,

    #[error("failed to initialise protocol session")]
    Init,

    #[error("protocol handshake failed")]
    Handshake,

    #[error("authentication failed")]
    Authentication,

    #[error("failed to open channel")]
    ChannelOpen,

    #[error("failed to execute command on channel")]
    ChannelExec,

    #[error("failed to read from channel")]
    Read,

    #[error("failed to write to channel")]
    Write,
}

impl SshError {
    /// Stable lowercase label for logs and CLI output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SshError::Connect => "connect",
            SshError::Init => "init",
            SshError::Handshake => "handshake",
            SshError::Authentication => "authentication",
            SshError::ChannelOpen => "channel_open",
            SshError::ChannelExec => "channel_exec",
            SshError::Read => "read",
            SshError::Write => "write",
        }
    }
}

pub type SshResult<T> = Result<T, SshError>;
