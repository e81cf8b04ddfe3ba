#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/transport/src/lib.rs
//!
//! # Overview
//!
//! `transport` places exported files into a destination directory, either
//! on the local filesystem ([`LocalTransport`]) or on a remote host through
//! the SCP sink protocol ([`ScpTransport`]). [`deliver_all`] drives a whole
//! batch through any [`Transport`].
//!
//! # Design
//!
//! The SCP exchange in [`scp`] is written against plain [`std::io::Read`] and
//! [`std::io::Write`], so it runs over any channel. [`ScpTransport`] obtains
//! channels from a [`RemoteShell`]; with the `embedded-ssh` feature,
//! [`SshSession`] provides one over russh.
//!
//! # Invariants
//!
//! - The destination directory is created before any file is sent.
//! - One failing file does not prevent the remaining files from being
//!   attempted.
//! - Every remote channel is closed when the send finishes, whether it
//!   succeeded or not.
//!
//! # Errors
//!
//! All operations return [`TransferError`]. [`deliver_all`] only returns an
//! error when the destination directory cannot be created; per-file failures
//! are collected in the [`BatchReport`].
//!
//! # Examples
//!
//! ```
//! use transport::{Delivery, LocalTransport, deliver_all};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();
//! let destination = dir.path().join("out");
//!
//! let report = deliver_all(
//!     &mut LocalTransport::new(),
//!     &destination,
//!     [Delivery::new(dir.path().join("a.jpg"), "a.jpg")],
//! )
//! .unwrap();
//!
//! assert!(report.is_success());
//! assert!(destination.join("a.jpg").exists());
//! ```

mod deliver;
mod error;
mod local;
mod remote;
pub mod scp;
#[cfg(feature = "embedded-ssh")]
mod ssh;
mod ssh_config;

pub use deliver::{BatchReport, Delivery, FailedDelivery, Transport, deliver_all};
pub use error::TransferError;
pub use local::LocalTransport;
pub use remote::{RemoteShell, ScpTransport, remote_path};
pub use scp::{Ack, quote_remote_path};
#[cfg(feature = "embedded-ssh")]
pub use ssh::{SshChannel, SshSession};
pub use ssh_config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SSH_PORT, SshConfig};
