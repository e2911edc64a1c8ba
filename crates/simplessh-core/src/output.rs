/// Exit code reported when the real completion status is unknown.
pub const EXIT_CODE_UNKNOWN: i32 = 127;

/// Captured result of one remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Remote exit status, or [`EXIT_CODE_UNKNOWN`] if the channel did not
    /// close cleanly.
    pub exit_code: i32,
    /// Set only when the remote process was terminated by a signal.
    pub exit_signal: Option<String>,
}

impl ExecOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.exit_signal.is_none()
    }
}

impl Default for ExecOutput {
    fn default() -> Self {
        Self {
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: EXIT_CODE_UNKNOWN,
            exit_signal: None,
        }
    }
}
