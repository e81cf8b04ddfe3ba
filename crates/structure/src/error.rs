//! Error types for the structure crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A physical node lacks the single page-order value the pruner rewrites.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StructuralInconsistencyError {
    /// The node carries no page-order metadata.
    #[error("physical node '{node}' has no page-order metadata '{field}'")]
    MissingPageOrder {
        /// Identifier of the offending node.
        node: String,
        /// Metadata name that was looked up.
        field: String,
    },

    /// The node carries more than one page-order value.
    #[error("physical node '{node}' has {count} page-order values for '{field}'")]
    AmbiguousPageOrder {
        /// Identifier of the offending node.
        node: String,
        /// Metadata name that was looked up.
        field: String,
        /// Number of values found.
        count: usize,
    },
}

/// Errors raised while assembling a [`StructuralDocument`](crate::StructuralDocument).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DocumentError {
    /// Two nodes or files share an identifier.
    #[error("identifier '{id}' is already in use")]
    DuplicateId {
        /// The repeated identifier.
        id: String,
    },

    /// A reference names a node that does not exist.
    #[error("no structural node with identifier '{id}'")]
    UnknownNode {
        /// The missing identifier.
        id: String,
    },

    /// A file pointer names a content file that does not exist.
    #[error("no content file with identifier '{id}'")]
    UnknownFile {
        /// The missing identifier.
        id: String,
    },
}

/// Errors raised while reading or writing METS documents.
#[derive(Debug, Error)]
pub enum MetsError {
    /// The XML is not well formed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute value is not valid UTF-8.
    #[error("attribute is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// An attribute value contains an unknown entity.
    #[error("attribute escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// A required attribute or element is absent.
    #[error("malformed METS document: {0}")]
    Malformed(String),

    /// Node or file identifiers are inconsistent.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Reading or writing the document file failed.
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        /// `"read"` or `"write"`.
        action: &'static str,
        /// File involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}
