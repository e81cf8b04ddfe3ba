#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `selection` turns the stored selection property of a document into the
//! set of images that an export run delivers. It covers two steps:
//!
//! - [`decode_selection`] parses the brace-delimited encoding
//!   (`{"00000018.jpg":1,"00000020.jpg":2}`) into a [`SelectionMap`] that
//!   maps every selected image name to its 1-based output position.
//! - [`resolve_images`] cross-references a [`SelectionMap`] with the listing
//!   of a flat source folder and yields [`ResolvedImage`] descriptors in
//!   folder-listing order.
//!
//! # Invariants
//!
//! - Names within one [`SelectionMap`] are unique and every position is unique,
//!   at least 1 and at most [`MAX_ORDER`]. Inputs violating either rule are rejected by the decoder
//!   instead of being silently overwritten.
//! - [`ResolvedImage::discovery_index`] counts matched files only, starting at
//!   zero and increasing by one per match in listing order. It is independent
//!   of the selection order; callers needing output order sort by
//!   [`ResolvedImage::order`].
//!
//! # Errors
//!
//! [`DecodeError`] describes malformed selection encodings. An empty or
//! absent encoding is not an error: it decodes to an empty map, which callers
//! treat as "nothing selected". [`ResolveError`] wraps I/O failures while
//! listing the source folder.
//!
//! # Examples
//!
//! ```
//! use selection::{decode_selection, resolve_images};
//! use std::path::Path;
//!
//! let map = decode_selection(r#"{"a.jpg":2,"c.jpg":1}"#)?;
//! let listing = ["a.jpg", "b.jpg", "c.jpg"];
//! let resolution = resolve_images(&map, Path::new("/images"), listing);
//!
//! let names: Vec<_> = resolution.images().iter().map(|image| image.name()).collect();
//! assert_eq!(names, ["a.jpg", "c.jpg"]);
//! assert_eq!(resolution.images()[1].order(), 1);
//! # Ok::<(), selection::DecodeError>(())
//! ```

mod decode;
mod error;
mod map;
mod resolve;

pub use decode::{decode_selection, encode_selection};
pub use error::{DecodeError, ResolveError};
pub use map::{MAX_ORDER, SelectionEntry, SelectionMap};
pub use resolve::{Resolution, ResolvedImage, list_source_folder, resolve_images};
