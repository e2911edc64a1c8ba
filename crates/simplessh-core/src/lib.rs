//! simplessh-core: shared types for the simplessh engine.
//!
//! Provides the closed error taxonomy, the capability traits a wrapped SSH
//! protocol implementation must expose, the exec output record, and the
//! growable capture buffer.

pub mod buffer;
pub mod error;
pub mod output;
pub mod protocol;

// Re-export commonly used items at crate root.
pub use buffer::GrowableBuffer;
pub use error::{SshError, SshResult};
pub use output::{ExecOutput, EXIT_CODE_UNKNOWN};
pub use protocol::{BlockDirections, Protocol, ProtocolChannel, Step, StepError};
