//! Protocol implementations the engine can drive.
//!
//! Only libssh2 (via the `ssh2` crate) is provided. Its results are folded
//! into [`Step`] here: `LIBSSH2_ERROR_EAGAIN` and `WouldBlock` I/O errors
//! become [`StepError::WouldBlock`], everything else is fatal.

pub mod libssh2;

pub use libssh2::{Ssh2Channel, Ssh2Protocol};

use std::io;

use rustix::io::Errno;

use simplessh_core::{Step, StepError};

/// libssh2's "would block" return code.
const LIBSSH2_ERROR_EAGAIN: i32 = -37;

/// Classify a libssh2 session-level result.
pub(crate) fn ssh_step<T>(result: Result<T, ssh2::Error>) -> Step<T> {
    result.map_err(|e| match e.code() {
        ssh2::ErrorCode::Session(LIBSSH2_ERROR_EAGAIN) => StepError::WouldBlock,
        _ => StepError::Fatal(e.to_string()),
    })
}

/// Classify a channel stream read or write.
pub(crate) fn io_step<T>(result: io::Result<T>) -> Step<T> {
    result.map_err(|e| {
        // ssh2 may surface EAGAIN as a raw OS error instead of WouldBlock.
        if e.kind() == io::ErrorKind::WouldBlock || Errno::from_io_error(&e) == Some(Errno::AGAIN) {
            StepError::WouldBlock
        } else {
            StepError::Fatal(e.to_string())
        }
    })
}
