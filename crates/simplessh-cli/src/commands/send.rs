//! `simplessh send <local> [user@]host:path`: upload a local file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use simplessh_client::with_session;

use super::{authenticate, ConnectOpts};
use crate::config::{parse_remote_path, parse_target};

/// Upload `local` to the remote destination with permission bits `mode`.
///
/// Returns the number of bytes transferred.
pub fn run(local: &Path, destination: &str, mode: u32, opts: &ConnectOpts) -> Result<u64> {
    let (target, remote_path) = parse_remote_path(destination)?;
    let (user, host) = parse_target(&target, &opts.default_user)?;

    let data =
        fs::read(local).with_context(|| format!("cannot read {}", local.display()))?;
    info!(local = %local.display(), remote = %format!("{user}@{host}:{remote_path}"), bytes = data.len(), "upload");

    let sent = with_session(&host, opts.port, &opts.session, |session| -> Result<u64> {
        authenticate(session, &user, opts)?;
        session
            .send_file(mode as i32, &data, &remote_path)
            .with_context(|| format!("failed to upload to {host}:{remote_path}"))
    })
    .with_context(|| format!("session with {host}:{} failed", opts.port))?;

    println!("{sent} bytes sent to {host}:{remote_path}");
    Ok(sent)
}

/// Parse an octal permission string such as `644` or `0o755`.
pub fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    let mode = u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal mode '{s}': {e}"))?;
    if mode > 0o777 {
        return Err(format!("mode '{s}' has bits outside 0777"));
    }
    Ok(mode)
}
