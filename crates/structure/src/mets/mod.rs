//! METS subset codec.
//!
//! Only the parts the export touches are modelled: the file section, the
//! physical and logical structure maps and the structure links. Page order
//! travels in the `ORDER` attribute and is exposed as the `physPageNumber`
//! metadata value; `ORDERLABEL` becomes `logicalPageNumber`. Everything
//! else in the source document is dropped on write.

mod reader;
mod writer;

pub use reader::parse_mets;
pub use writer::write_mets;

/// METS namespace URI.
pub const METS_NAMESPACE: &str = "http://www.loc.gov/METS/";
/// XLink namespace URI.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

pub(crate) const ORDER_METADATA: &str = "physPageNumber";
pub(crate) const ORDER_LABEL_METADATA: &str = "logicalPageNumber";

/// Extracts the file name from a `FLocat` location (URL or path).
pub(crate) fn location_file_name(location: &str) -> &str {
    location
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(location)
}
