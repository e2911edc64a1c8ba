pub mod exec;
pub mod send;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use simplessh_client::{Session, SessionConfig};
use tracing::debug;

/// Environment variable holding the password for password authentication.
pub const PASSWORD_ENV: &str = "SIMPLESSH_PASSWORD";

/// Environment variable holding the private key passphrase.
pub const PASSPHRASE_ENV: &str = "SIMPLESSH_PASSPHRASE";

/// Connection settings resolved from flags and the config file.
#[derive(Debug, Clone)]
pub struct ConnectOpts {
    pub port: u16,
    pub default_user: String,
    pub identity: Option<PathBuf>,
    pub session: SessionConfig,
}

/// Authenticate an open session as `user`.
///
/// Uses the identity file when one is configured, otherwise the password
/// from [`PASSWORD_ENV`].
pub fn authenticate(session: &mut Session, user: &str, opts: &ConnectOpts) -> Result<()> {
    match &opts.identity {
        Some(private_key) => {
            let public_key = public_key_for(private_key);
            let passphrase = std::env::var(PASSPHRASE_ENV).ok();
            debug!(key = %private_key.display(), public = ?public_key, "public key auth");
            session
                .authenticate_with_key(
                    user,
                    public_key.as_deref(),
                    private_key,
                    passphrase.as_deref(),
                )
                .with_context(|| format!("key {} rejected for {user}", private_key.display()))?;
        }
        None => {
            let password = std::env::var(PASSWORD_ENV).with_context(|| {
                format!("no identity given and {PASSWORD_ENV} is not set")
            })?;
            session
                .authenticate_with_password(user, &password)
                .with_context(|| format!("password rejected for {user}"))?;
        }
    }
    Ok(())
}

/// `<private>.pub` next to the private key, if it exists.
fn public_key_for(private_key: &Path) -> Option<PathBuf> {
    let mut name = private_key.as_os_str().to_owned();
    name.push(".pub");
    let candidate = PathBuf::from(name);
    candidate.exists().then_some(candidate)
}
