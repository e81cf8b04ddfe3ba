//! Error types for delivery.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scp::Ack;

/// Failure delivering a file or preparing a destination.
#[derive(Debug, Error)]
pub enum TransferError {
    /// A local filesystem operation failed.
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        /// What was being attempted ("copy", "create directory", ...).
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The remote side answered an SCP step with a failure acknowledgement.
    #[error("{ack} while sending '{target}'")]
    Ack {
        /// Remote path of the file being sent.
        target: String,
        /// The acknowledgement received.
        ack: Ack,
    },
    /// The SCP exchange could not proceed.
    #[error("scp protocol failure while sending '{target}': {message}")]
    Protocol {
        /// Remote path of the file being sent.
        target: String,
        /// Description of the failure.
        message: String,
    },
    /// Reading or writing the remote channel failed.
    #[error("channel I/O failed while sending '{target}': {source}")]
    Channel {
        /// Remote path of the file being sent.
        target: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The SSH connection could not be established.
    #[error("failed to connect to {address}: {message}")]
    Connect {
        /// `host:port` that was dialled.
        address: String,
        /// Description of the failure.
        message: String,
    },
    /// The server's host key is unknown or does not match the known hosts file.
    #[error("host key for {host} not trusted by '{}'", known_hosts.display())]
    HostKey {
        /// Host being verified.
        host: String,
        /// Known hosts file consulted.
        known_hosts: PathBuf,
    },
    /// The server refused the credentials.
    #[error("authentication as '{user}' on {host} was rejected")]
    Authentication {
        /// User name offered.
        user: String,
        /// Host refusing it.
        host: String,
    },
    /// The SSH session failed after it was established.
    #[error("ssh session error: {0}")]
    Ssh(String),
    /// A remote command finished unsuccessfully.
    #[error("remote command `{command}` failed{}", status.map_or_else(String::new, |s| format!(" with status {s}")))]
    RemoteCommand {
        /// Command that was run.
        command: String,
        /// Exit status, when the server reported one.
        status: Option<u32>,
    },
}

impl TransferError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
