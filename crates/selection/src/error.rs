//! Error types for selection decoding and resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while decoding a selection encoding.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    /// The encoding does not start with `{` and end with `}`.
    #[error("selection encoding must be enclosed in braces")]
    UnbalancedBraces,

    /// An item lacks the `:` separating name and position.
    #[error("selection item '{item}' has no ':' separator")]
    MissingSeparator {
        /// The offending item, trimmed.
        item: String,
    },

    /// The name part of an item is not enclosed in double quotes.
    #[error("selection item '{item}' has an unquoted image name")]
    UnquotedName {
        /// The offending item, trimmed.
        item: String,
    },

    /// The name part of an item is `""`.
    #[error("selection item '{item}' has an empty image name")]
    EmptyName {
        /// The offending item, trimmed.
        item: String,
    },

    /// The position is not a positive 32-bit integer.
    #[error("image '{name}' has invalid position '{value}'")]
    InvalidOrder {
        /// Image name the position belongs to.
        name: String,
        /// Raw position token.
        value: String,
    },

    /// The position exceeds [`MAX_ORDER`](crate::MAX_ORDER).
    #[error("image '{name}' has position {order}, the highest allowed is {max}")]
    OrderOutOfRange {
        /// Image name the position belongs to.
        name: String,
        /// Requested position.
        order: u32,
        /// Highest accepted position.
        max: u32,
    },

    /// The same image name appears more than once.
    #[error("image '{name}' is selected more than once")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// Two images claim the same position.
    #[error("position {order} is assigned to both '{first}' and '{second}'")]
    DuplicateOrder {
        /// The contested position.
        order: u32,
        /// Name holding the position first.
        first: String,
        /// Name claiming it again.
        second: String,
    },
}

/// Errors produced while resolving a selection against a source folder.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Listing the source folder failed.
    #[error("failed to list source folder '{}': {source}", path.display())]
    Listing {
        /// Folder that was being listed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}
