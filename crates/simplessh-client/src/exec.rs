//! Remote command execution over a session channel.
//!
//! stdout and stderr share one transport with independent flow control, so
//! both are drained in the same loop into separate growable buffers.

use tracing::{debug, info, warn};

use simplessh_core::{
    ExecOutput, GrowableBuffer, Protocol, ProtocolChannel, SshError, SshResult, StepError,
    EXIT_CODE_UNKNOWN,
};

use crate::session::Session;

impl<P: Protocol> Session<P> {
    /// Execute `command` and capture its output and exit status.
    ///
    /// The exit code stays [`EXIT_CODE_UNKNOWN`] when the channel does not
    /// close cleanly. The channel is released on every return path.
    pub fn exec(&mut self, command: &str) -> SshResult<ExecOutput> {
        let mut channel = self
            .until_ready(|protocol| protocol.open_session_channel())
            .map_err(|cause| {
                warn!(kind = SshError::ChannelOpen.kind_name(), %cause, "could not open session channel");
                SshError::ChannelOpen
            })?;
        debug!(command, "session channel opened");

        self.until_ready(|_| channel.exec(command)).map_err(|cause| {
            warn!(kind = SshError::ChannelExec.kind_name(), command, %cause, "exec request rejected");
            SshError::ChannelExec
        })?;

        let (stdout, stderr) = self.drain(&mut channel)?;
        let mut output = ExecOutput {
            stdout,
            stderr,
            exit_code: EXIT_CODE_UNKNOWN,
            exit_signal: None,
        };

        match self.until_ready(|_| channel.close()) {
            Ok(()) => {
                output.exit_code = channel.exit_status().unwrap_or(EXIT_CODE_UNKNOWN);
                output.exit_signal = channel.exit_signal().filter(|s| !s.is_empty());
            }
            Err(cause) => warn!(command, %cause, "channel did not close cleanly"),
        }
        drop(channel);

        info!(
            command,
            exit_code = output.exit_code,
            signal = output.exit_signal.as_deref().unwrap_or(""),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "command finished"
        );
        Ok(output)
    }

    /// Read both streams until each reports end of data in the same pass.
    fn drain(&mut self, channel: &mut P::Channel) -> SshResult<(Vec<u8>, Vec<u8>)> {
        let mut out = GrowableBuffer::new();
        let mut err = GrowableBuffer::new();

        loop {
            let rc = channel.read_stdout(out.spare_mut());
            let rc2 = channel.read_stderr(err.spare_mut());

            match (rc, rc2) {
                (Ok(0), Ok(0)) => break,
                (Err(StepError::Fatal(cause)), _) | (_, Err(StepError::Fatal(cause))) => {
                    warn!(kind = SshError::Read.kind_name(), %cause, "channel read failed");
                    return Err(SshError::Read);
                }
                (rc, rc2) => {
                    let mut progressed = false;
                    if let Ok(n) = rc {
                        if n > 0 {
                            out.advance(n);
                            progressed = true;
                        }
                    }
                    if let Ok(n) = rc2 {
                        if n > 0 {
                            err.advance(n);
                            progressed = true;
                        }
                    }
                    if !progressed {
                        self.wait();
                    }
                }
            }
        }

        Ok((out.into_vec(), err.into_vec()))
    }
}
