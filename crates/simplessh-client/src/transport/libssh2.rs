//! [`Protocol`] implementation over libssh2.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::Path;

use simplessh_core::{BlockDirections, Protocol, ProtocolChannel, Step, StepError};

use super::{io_step, ssh_step};

/// A non-blocking libssh2 session bound to a connected socket.
pub struct Ssh2Protocol {
    session: ssh2::Session,
}

impl Ssh2Protocol {
    /// Create a session over a clone of `socket` and switch it to
    /// non-blocking mode.
    pub fn new(socket: &TcpStream) -> io::Result<Self> {
        ssh2::init();
        let stream = socket.try_clone()?;
        let mut session = ssh2::Session::new()?;
        session.set_tcp_stream(stream);
        session.set_blocking(false);
        Ok(Self { session })
    }
}

fn utf8_key<'a>(bytes: &'a [u8], what: &str) -> Step<&'a str> {
    std::str::from_utf8(bytes).map_err(|_| StepError::Fatal(format!("{what} is not valid UTF-8")))
}

impl Protocol for Ssh2Protocol {
    type Channel = Ssh2Channel;

    fn handshake(&mut self) -> Step<()> {
        ssh_step(self.session.handshake())
    }

    fn set_timeout(&mut self, timeout_ms: u32) {
        self.session.set_timeout(timeout_ms);
    }

    fn auth_password(&mut self, username: &str, password: &str) -> Step<()> {
        ssh_step(self.session.userauth_password(username, password))
    }

    fn auth_key_file(
        &mut self,
        username: &str,
        public_key: Option<&Path>,
        private_key: &Path,
        passphrase: Option<&str>,
    ) -> Step<()> {
        ssh_step(
            self.session
                .userauth_pubkey_file(username, public_key, private_key, passphrase),
        )
    }

    fn auth_key_memory(
        &mut self,
        username: &str,
        public_key: Option<&[u8]>,
        private_key: &[u8],
        passphrase: Option<&str>,
    ) -> Step<()> {
        let private_key = utf8_key(private_key, "private key")?;
        let public_key = match public_key {
            Some(bytes) => Some(utf8_key(bytes, "public key")?),
            None => None,
        };
        ssh_step(self.session.userauth_pubkey_memory(
            username,
            public_key,
            private_key,
            passphrase,
        ))
    }

    fn open_session_channel(&mut self) -> Step<Ssh2Channel> {
        ssh_step(self.session.channel_session()).map(Ssh2Channel::new)
    }

    fn open_scp_send(&mut self, path: &Path, mode: i32, size: u64) -> Step<Ssh2Channel> {
        ssh_step(self.session.scp_send(path, mode, size, None)).map(Ssh2Channel::new)
    }

    fn block_directions(&self) -> BlockDirections {
        match self.session.block_directions() {
            ssh2::BlockDirections::None => BlockDirections::None,
            ssh2::BlockDirections::Inbound => BlockDirections::Inbound,
            ssh2::BlockDirections::Outbound => BlockDirections::Outbound,
            ssh2::BlockDirections::Both => BlockDirections::Both,
        }
    }

    fn host_key_fingerprint(&self) -> Option<Vec<u8>> {
        self.session
            .host_key_hash(ssh2::HashType::Sha256)
            .map(<[u8]>::to_vec)
    }

    fn disconnect(&mut self, description: &str) -> Step<()> {
        ssh_step(self.session.disconnect(None, description, None))
    }
}

/// A libssh2 channel. Dropping it frees the channel.
pub struct Ssh2Channel {
    inner: ssh2::Channel,
}

impl Ssh2Channel {
    fn new(inner: ssh2::Channel) -> Self {
        Self { inner }
    }
}

impl ProtocolChannel for Ssh2Channel {
    fn exec(&mut self, command: &str) -> Step<()> {
        ssh_step(self.inner.exec(command))
    }

    fn read_stdout(&mut self, buf: &mut [u8]) -> Step<usize> {
        io_step(self.inner.read(buf))
    }

    fn read_stderr(&mut self, buf: &mut [u8]) -> Step<usize> {
        io_step(self.inner.stderr().read(buf))
    }

    fn write(&mut self, data: &[u8]) -> Step<usize> {
        io_step(self.inner.write(data))
    }

    fn send_eof(&mut self) -> Step<()> {
        ssh_step(self.inner.send_eof())
    }

    fn close(&mut self) -> Step<()> {
        ssh_step(self.inner.close())
    }

    fn exit_status(&self) -> Option<i32> {
        self.inner.exit_status().ok()
    }

    fn exit_signal(&self) -> Option<String> {
        self.inner
            .exit_signal()
            .ok()
            .and_then(|signal| signal.exit_signal)
    }
}
