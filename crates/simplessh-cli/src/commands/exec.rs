//! `simplessh exec [user@]host command...`: one-off remote command execution.
//!
//! Connects, runs the command, copies captured stdout and stderr to the local
//! streams, and returns the remote exit code.

use std::io::{self, Write as _};

use anyhow::{Context, Result};
use tracing::info;

use simplessh_client::{with_session, ExecOutput};

use super::{authenticate, ConnectOpts};
use crate::config::parse_target;

/// Execute a remote command and print its output. Returns the exit code.
pub fn run(target: &str, command: &str, opts: &ConnectOpts) -> Result<i32> {
    let (user, host) = parse_target(target, &opts.default_user)?;
    info!(user = %user, host = %host, command = %command, "exec");

    let output = with_session(&host, opts.port, &opts.session, |session| -> Result<ExecOutput> {
        authenticate(session, &user, opts)?;
        session
            .exec(command)
            .with_context(|| format!("failed to run '{command}' on {host}"))
    })
    .with_context(|| format!("session with {host}:{} failed", opts.port))?;

    io::stdout().write_all(&output.stdout)?;
    io::stdout().flush()?;
    io::stderr().write_all(&output.stderr)?;

    if let Some(signal) = &output.exit_signal {
        eprintln!("simplessh: remote command terminated by signal {signal}");
    }
    Ok(output.exit_code)
}
