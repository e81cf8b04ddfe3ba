//! Sender side of the SCP "sink" exchange.
//!
//! The remote end runs `scp -t <target>`. Every step the sender takes is
//! answered with one acknowledgement byte:
//!
//! | byte | meaning                                   |
//! |------|-------------------------------------------|
//! | `0`  | success                                   |
//! | `1`  | error, followed by a message up to `\n`   |
//! | `2`  | fatal error, followed by a message        |
//!
//! Any other byte is tolerated and treated as success. End of stream where an
//! acknowledgement is due counts as failure.
//!
//! The exchange for one file is: read the greeting ack, send
//! `C0644 <size> <name>\n`, read an ack, stream exactly `size` bytes followed
//! by a single `\0`, read the final ack.

use std::fmt;
use std::io::{self, Read, Write};

use crate::TransferError;

/// Size of each content chunk written to the channel.
pub const CHUNK_SIZE: usize = 1024;

/// Permission bits announced for every transferred file.
pub const FILE_MODE: &str = "0644";

/// One acknowledgement read from the remote side.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Ack {
    /// Byte `0`.
    Success,
    /// Byte `1` with its message.
    Error(String),
    /// Byte `2` with its message.
    Fatal(String),
    /// Any other byte.
    Unknown(u8),
    /// The stream ended before an acknowledgement arrived.
    Eof,
}

impl Ack {
    /// The numeric code, `-1` for end of stream.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Error(_) => 1,
            Self::Fatal(_) => 2,
            Self::Unknown(byte) => i32::from(*byte),
            Self::Eof => -1,
        }
    }

    /// Whether the sender may continue.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Success | Self::Unknown(_))
    }

    /// Message text carried by an error acknowledgement.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error(message) | Self::Fatal(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error(message) => {
                write!(f, "Error happened trying to export file using scp: {message}")
            }
            Self::Fatal(message) => {
                write!(f, "Fatal error happened trying to export file using scp: {message}")
            }
            Self::Unknown(byte) => write!(f, "unrecognised acknowledgement {byte}"),
            Self::Eof => f.write_str("connection closed before acknowledgement"),
        }
    }
}

/// Reads one acknowledgement.
///
/// # Errors
///
/// Propagates read failures other than end of stream.
pub fn read_ack<R: Read + ?Sized>(reader: &mut R) -> io::Result<Ack> {
    let Some(code) = read_byte(reader)? else {
        return Ok(Ack::Eof);
    };
    Ok(match code {
        0 => Ack::Success,
        1 => Ack::Error(read_message(reader)?),
        2 => Ack::Fatal(read_message(reader)?),
        other => Ack::Unknown(other),
    })
}

fn read_byte<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

fn read_message<R: Read + ?Sized>(reader: &mut R) -> io::Result<String> {
    let mut message = Vec::new();
    while let Some(byte) = read_byte(reader)? {
        if byte == b'\n' {
            break;
        }
        message.push(byte);
    }
    Ok(String::from_utf8_lossy(&message).into_owned())
}

/// Reads an acknowledgement and turns failures into [`TransferError::Ack`].
///
/// Error and fatal messages are also logged.
///
/// # Errors
///
/// Fails on error, fatal and end-of-stream acknowledgements, and on channel
/// read failures.
pub fn expect_ack<R: Read + ?Sized>(reader: &mut R, target: &str) -> Result<(), TransferError> {
    let ack = read_ack(reader).map_err(|source| channel_error(target, source))?;
    match &ack {
        Ack::Success => Ok(()),
        Ack::Unknown(byte) => {
            tracing::debug!(target: "export::scp", byte, "treating unknown acknowledgement as success");
            Ok(())
        }
        Ack::Error(_) | Ack::Fatal(_) | Ack::Eof => {
            tracing::error!(target: "export::scp", code = ack.code(), "{ack}");
            Err(TransferError::Ack {
                target: target.to_owned(),
                ack,
            })
        }
    }
}

/// Sends one file over an open `scp -t` channel.
///
/// Exactly `size` bytes are read from `content`; a shorter source is a
/// protocol failure.
///
/// # Errors
///
/// Returns [`TransferError`] when an acknowledgement reports failure, the
/// channel fails, or `name` cannot be expressed in the control line.
pub fn send_file<C, R>(
    channel: &mut C,
    content: &mut R,
    size: u64,
    name: &str,
    target: &str,
) -> Result<(), TransferError>
where
    C: Read + Write + ?Sized,
    R: Read + ?Sized,
{
    if name.is_empty() || name.contains(['\n', '/']) {
        return Err(TransferError::Protocol {
            target: target.to_owned(),
            message: format!("file name {name:?} cannot be sent"),
        });
    }

    expect_ack(channel, target)?;

    let control = format!("C{FILE_MODE} {size} {name}\n");
    channel
        .write_all(control.as_bytes())
        .and_then(|()| channel.flush())
        .map_err(|source| channel_error(target, source))?;
    expect_ack(channel, target)?;

    let mut buffer = [0u8; CHUNK_SIZE];
    let mut limited = content.take(size);
    let mut sent = 0u64;
    loop {
        let read = match limited.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(TransferError::Protocol {
                    target: target.to_owned(),
                    message: format!("reading source failed: {source}"),
                });
            }
        };
        channel
            .write_all(&buffer[..read])
            .map_err(|source| channel_error(target, source))?;
        sent += read as u64;
    }
    if sent != size {
        return Err(TransferError::Protocol {
            target: target.to_owned(),
            message: format!("source ended after {sent} of {size} bytes"),
        });
    }

    channel
        .write_all(&[0])
        .and_then(|()| channel.flush())
        .map_err(|source| channel_error(target, source))?;
    expect_ack(channel, target)?;

    tracing::debug!(target: "export::scp", %target, size, "file sent");
    Ok(())
}

/// Quotes `path` for a POSIX shell on the remote side.
#[must_use]
pub fn quote_remote_path(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('\'');
    for c in path.chars() {
        if c == '\'' {
            quoted.push_str("'\"'\"'");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

fn channel_error(target: &str, source: io::Error) -> TransferError {
    TransferError::Channel {
        target: target.to_owned(),
        source,
    }
}
