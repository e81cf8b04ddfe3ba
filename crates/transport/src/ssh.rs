//! Embedded SSH client built on russh.
//!
//! russh is asynchronous; [`SshSession`] owns a small tokio runtime and blocks
//! on it so callers keep a synchronous [`RemoteShell`] interface. Channels are
//! bridged to [`Read`] + [`Write`] with [`SyncIoBridge`].

use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use russh::client::{self, Handle, Msg};
use russh::keys::{PublicKey, check_known_hosts_path};
use russh::{ChannelMsg, ChannelStream, Disconnect};
use tokio::runtime::{Builder, Runtime};
use tokio_util::io::SyncIoBridge;

use crate::{RemoteShell, SshConfig, TransferError};

/// Accepts only server keys listed in a known hosts file.
struct KnownHostsVerifier {
    host: String,
    port: u16,
    known_hosts: PathBuf,
}

impl client::Handler for KnownHostsVerifier {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        match check_known_hosts_path(&self.host, self.port, server_public_key, &self.known_hosts) {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::warn!(
                    target: "export::transport",
                    host = %self.host,
                    known_hosts = %self.known_hosts.display(),
                    "server key not listed in known hosts"
                );
                Ok(false)
            }
            Err(error) => {
                tracing::warn!(
                    target: "export::transport",
                    host = %self.host,
                    %error,
                    "server key rejected"
                );
                Ok(false)
            }
        }
    }
}

/// An authenticated SSH connection.
///
/// The connection is closed when the session is dropped.
pub struct SshSession {
    handle: Handle<KnownHostsVerifier>,
    endpoint: String,
    runtime: Runtime,
}

impl SshSession {
    /// Connects, verifies the host key and authenticates with the password.
    ///
    /// # Errors
    ///
    /// - [`TransferError::Connect`] when the host cannot be reached in time,
    /// - [`TransferError::HostKey`] when the server key is not trusted,
    /// - [`TransferError::Authentication`] when the password is refused.
    pub fn connect(config: &SshConfig) -> Result<Self, TransferError> {
        let address = format!("{}:{}", config.host, config.port);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("export-ssh")
            .enable_all()
            .build()
            .map_err(|error| TransferError::Connect {
                address: address.clone(),
                message: format!("cannot start runtime: {error}"),
            })?;

        let client_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..client::Config::default()
        });
        let verifier = KnownHostsVerifier {
            host: config.host.clone(),
            port: config.port,
            known_hosts: config.known_hosts.clone(),
        };

        let connected = runtime.block_on(async {
            tokio::time::timeout(
                config.timeout,
                client::connect(client_config, (config.host.as_str(), config.port), verifier),
            )
            .await
        });
        let mut handle = match connected {
            Ok(Ok(handle)) => handle,
            Ok(Err(russh::Error::UnknownKey)) => {
                return Err(TransferError::HostKey {
                    host: config.host.clone(),
                    known_hosts: config.known_hosts.clone(),
                });
            }
            Ok(Err(error)) => {
                return Err(TransferError::Connect {
                    address,
                    message: error.to_string(),
                });
            }
            Err(_) => {
                return Err(TransferError::Connect {
                    address,
                    message: format!("timed out after {:?}", config.timeout),
                });
            }
        };

        let auth = runtime
            .block_on(handle.authenticate_password(config.user.as_str(), config.password.as_str()))
            .map_err(ssh_error)?;
        if !auth.success() {
            return Err(TransferError::Authentication {
                user: config.user.clone(),
                host: config.host.clone(),
            });
        }

        tracing::info!(target: "export::transport", endpoint = %config.endpoint(), "ssh session established");
        Ok(Self {
            handle,
            endpoint: config.endpoint(),
            runtime,
        })
    }
}

impl RemoteShell for SshSession {
    type Channel = SshChannel;

    fn run(&mut self, command: &str) -> Result<Option<u32>, TransferError> {
        let handle = &self.handle;
        self.runtime
            .block_on(async {
                let mut channel = handle.channel_open_session().await?;
                channel.exec(true, command).await?;
                let mut status = None;
                while let Some(message) = channel.wait().await {
                    if let ChannelMsg::ExitStatus { exit_status } = message {
                        status = Some(exit_status);
                    }
                }
                Ok::<_, russh::Error>(status)
            })
            .map_err(ssh_error)
    }

    fn exec(&mut self, command: &str) -> Result<SshChannel, TransferError> {
        let handle = &self.handle;
        let channel = self
            .runtime
            .block_on(async {
                let channel = handle.channel_open_session().await?;
                channel.exec(true, command).await?;
                Ok::<_, russh::Error>(channel)
            })
            .map_err(ssh_error)?;
        Ok(SshChannel {
            bridge: SyncIoBridge::new_with_handle(
                Box::pin(channel.into_stream()),
                self.runtime.handle().clone(),
            ),
        })
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

impl fmt::Debug for SshSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshSession")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        let handle = &self.handle;
        if let Err(error) = self
            .runtime
            .block_on(handle.disconnect(Disconnect::ByApplication, "", "en"))
        {
            tracing::debug!(target: "export::transport", %error, "disconnect failed");
        }
    }
}

/// Blocking stream over an exec channel. Dropping it sends EOF.
pub struct SshChannel {
    bridge: SyncIoBridge<Pin<Box<ChannelStream<Msg>>>>,
}

impl Read for SshChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.bridge.read(buf)
    }
}

impl Write for SshChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bridge.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.bridge.flush()
    }
}

impl Drop for SshChannel {
    fn drop(&mut self) {
        if let Err(error) = self.bridge.shutdown() {
            tracing::debug!(target: "export::transport", %error, "closing channel failed");
        }
    }
}

fn ssh_error(error: russh::Error) -> TransferError {
    TransferError::Ssh(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use super::*;

    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[test]
    fn refused_connection_is_a_connect_error() {
        let port = closed_port();
        let config = SshConfig::new("127.0.0.1", "goobi", "pw", "/nonexistent/known_hosts")
            .with_port(port)
            .with_timeout(Duration::from_secs(5));

        match SshSession::connect(&config) {
            Err(TransferError::Connect { address, .. }) => {
                assert_eq!(address, format!("127.0.0.1:{port}"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = SshConfig::new("127.0.0.1", "goobi", "pw", "/nonexistent/known_hosts")
            .with_port(port)
            .with_timeout(Duration::from_millis(200));

        let error = SshSession::connect(&config).unwrap_err();
        assert!(matches!(error, TransferError::Connect { .. }), "{error}");
        drop(listener);
    }
}
