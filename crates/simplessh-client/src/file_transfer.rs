//! SCP-style upload of an in-memory payload.
//!
//! The total length is declared when the channel opens, then the payload is
//! streamed in bounded chunks. Partial writes advance the cursor by exactly
//! what the channel accepted.

use std::path::Path;

use tracing::{debug, info, trace, warn};

use simplessh_core::{Protocol, ProtocolChannel, SshError, SshResult, StepError};

use crate::session::Session;

/// Default chunk size for file transfers: 16 KB.
pub const CHUNK_SIZE: usize = 16 * 1024;

impl<P: Protocol> Session<P> {
    /// Upload `data` to `destination` with permission bits `mode`.
    ///
    /// Only the low nine permission bits of `mode` are sent. Returns the
    /// number of bytes transferred, which equals `data.len()` on success.
    pub fn send_file(
        &mut self,
        mode: i32,
        data: &[u8],
        destination: impl AsRef<Path>,
    ) -> SshResult<u64> {
        let destination = destination.as_ref();
        let total = data.len() as u64;
        let mode = mode & 0o777;

        let mut channel = self
            .until_ready(|protocol| protocol.open_scp_send(destination, mode, total))
            .map_err(|cause| {
                warn!(kind = SshError::ChannelOpen.kind_name(), path = %destination.display(), %cause, "could not open scp channel");
                SshError::ChannelOpen
            })?;
        debug!(path = %destination.display(), mode = %format!("{mode:o}"), total, "scp channel opened");

        let mut transferred: u64 = 0;
        for chunk in data.chunks(self.chunk_size()) {
            let mut rest = chunk;
            while !rest.is_empty() {
                match channel.write(rest) {
                    Ok(0) | Err(StepError::WouldBlock) => self.wait(),
                    Ok(n) => {
                        let n = n.min(rest.len());
                        rest = &rest[n..];
                        transferred += n as u64;
                    }
                    Err(StepError::Fatal(cause)) => {
                        warn!(kind = SshError::Write.kind_name(), path = %destination.display(), transferred, %cause, "scp write failed");
                        return Err(SshError::Write);
                    }
                }
            }
            trace!(transferred, total, "chunk written");
        }

        if let Err(cause) = self.until_ready(|_| channel.send_eof()) {
            warn!(%cause, "scp channel did not accept eof");
        }
        if let Err(cause) = self.until_ready(|_| channel.close()) {
            warn!(%cause, "scp channel did not close cleanly");
        }
        drop(channel);

        info!(path = %destination.display(), transferred, "file sent");
        Ok(transferred)
    }
}
