//! SCP delivery over an abstract remote shell.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::scp::{self, quote_remote_path};
use crate::{TransferError, Transport};

/// A connection able to run commands on the remote host.
///
/// [`SshSession`](crate::SshSession) is the production implementation; tests
/// script the remote end.
pub trait RemoteShell {
    /// Bidirectional stream attached to a running command's stdio.
    type Channel: Read + Write;

    /// Runs `command` to completion and returns its exit status.
    ///
    /// # Errors
    ///
    /// Fails when the command cannot be started or the session breaks.
    fn run(&mut self, command: &str) -> Result<Option<u32>, TransferError>;

    /// Starts `command` and returns a channel bound to its stdin and stdout.
    /// Dropping the channel closes it.
    ///
    /// # Errors
    ///
    /// Fails when the command cannot be started.
    fn exec(&mut self, command: &str) -> Result<Self::Channel, TransferError>;

    /// Human-readable endpoint, such as `user@host:22`.
    fn endpoint(&self) -> String;
}

impl<S: RemoteShell + ?Sized> RemoteShell for &mut S {
    type Channel = S::Channel;

    fn run(&mut self, command: &str) -> Result<Option<u32>, TransferError> {
        (**self).run(command)
    }

    fn exec(&mut self, command: &str) -> Result<Self::Channel, TransferError> {
        (**self).exec(command)
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

/// Delivers files with `scp -t` over a [`RemoteShell`].
#[derive(Debug)]
pub struct ScpTransport<S> {
    shell: S,
}

impl<S: RemoteShell> ScpTransport<S> {
    /// Wraps an established shell.
    pub const fn new(shell: S) -> Self {
        Self { shell }
    }

    /// Returns the shell.
    pub fn into_inner(self) -> S {
        self.shell
    }
}

/// Remote path of `name` inside `directory`, always `/`-separated.
#[must_use]
pub fn remote_path(directory: &Path, name: &str) -> String {
    let directory = directory.to_string_lossy();
    let trimmed = directory.trim_end_matches('/');
    if trimmed.is_empty() && directory.starts_with('/') {
        format!("/{name}")
    } else if trimmed.is_empty() {
        name.to_owned()
    } else {
        format!("{trimmed}/{name}")
    }
}

impl<S: RemoteShell> Transport for ScpTransport<S> {
    fn describe(&self) -> String {
        format!("scp to {}", self.shell.endpoint())
    }

    fn create_directory(&mut self, directory: &Path) -> Result<(), TransferError> {
        let command = format!("mkdir -p {}", quote_remote_path(&directory.to_string_lossy()));
        match self.shell.run(&command)? {
            Some(0) => Ok(()),
            status => Err(TransferError::RemoteCommand { command, status }),
        }
    }

    fn send_file(
        &mut self,
        source: &Path,
        directory: &Path,
        name: &str,
    ) -> Result<(), TransferError> {
        let file = File::open(source).map_err(|err| TransferError::io("open", source, err))?;
        let size = file
            .metadata()
            .map_err(|err| TransferError::io("inspect", source, err))?
            .len();

        let target = remote_path(directory, name);
        let mut channel = self
            .shell
            .exec(&format!("scp -t {}", quote_remote_path(&target)))?;
        scp::send_file(&mut channel, &mut BufReader::new(file), size, name, &target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_paths_join_with_slashes() {
        assert_eq!(remote_path(Path::new("/srv/export/"), "a.jpg"), "/srv/export/a.jpg");
        assert_eq!(remote_path(Path::new("/srv/export"), "a.jpg"), "/srv/export/a.jpg");
        assert_eq!(remote_path(Path::new("/"), "a.jpg"), "/a.jpg");
        assert_eq!(remote_path(Path::new(""), "a.jpg"), "a.jpg");
    }
}
