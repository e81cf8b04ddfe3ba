use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use zeroize::Zeroizing;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default limit for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters for opening an SSH session with password authentication.
#[derive(Clone)]
pub struct SshConfig {
    /// Remote host name or address.
    pub host: String,
    /// Remote port.
    pub port: u16,
    /// Login name.
    pub user: String,
    /// Login password, wiped from memory on drop.
    pub password: Zeroizing<String>,
    /// `known_hosts` file the server key must appear in.
    pub known_hosts: PathBuf,
    /// Limit for connecting and for channel inactivity.
    pub timeout: Duration,
}

impl SshConfig {
    /// Builds a configuration using the default port and timeout.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        known_hosts: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            user: user.into(),
            password: Zeroizing::new(password.into()),
            known_hosts: known_hosts.into(),
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Overrides the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `user@host:port`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

impl fmt::Debug for SshConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("known_hosts", &self.known_hosts)
            .field("timeout", &self.timeout)
            .finish()
    }
}
