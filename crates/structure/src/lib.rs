#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/structure/src/lib.rs
//!
//! # Overview
//!
//! `structure` models the structural description of a digitised work and
//! restricts it to a user's image selection. A [`StructuralDocument`] holds
//! three collections:
//!
//! - physical pages ([`PhysicalNode`]) under an optional [`PhysicalRoot`],
//! - a tree of logical divisions ([`LogicalNode`]), and
//! - content files ([`ContentFile`]) referenced by the pages.
//!
//! [`prune`] removes unselected pages and everything that pointed at them,
//! then renumbers the remaining pages. The [`mets`] module reads and writes
//! the subset of METS that carries this information, and [`MetsFile`]
//! exposes it through the [`StructureStore`] trait.
//!
//! # Design
//!
//! Pages and logical divisions live in arenas owned by the document.
//! References are stored as identifier pairs on both endpoints and can only
//! be changed through [`StructuralDocument::link`] and
//! [`StructuralDocument::unlink`], which keep the two sides in step. The
//! pruner plans every change first and applies the plan in a second pass, so
//! no collection is modified while it is being walked.
//!
//! # Invariants
//!
//! After a successful [`prune`]:
//!
//! - every remaining page's image name is selected,
//! - each remaining page's page-order value equals its selected position,
//!   and pages appear in ascending position,
//! - no reference or file pointer has a missing or one-sided endpoint
//!   ([`StructuralDocument::dangling_references`] is empty),
//! - content files referenced only by removed pages are gone.
//!
//! # Errors
//!
//! [`StructuralInconsistencyError`] reports a retained page without exactly
//! one page-order value. [`MetsError`] covers XML, identifier and I/O
//! problems in the codec; [`DocumentError`] covers identifier clashes when
//! assembling a document by hand.
//!
//! # Examples
//!
//! ```
//! use selection::decode_selection;
//! use structure::{PhysicalNode, PruneOptions, StructuralDocument, prune};
//!
//! let mut document = StructuralDocument::new();
//! for (id, image) in [("PHYS_0001", "a.jpg"), ("PHYS_0002", "b.jpg")] {
//!     document
//!         .add_physical(PhysicalNode::new(id, "page", image).with_metadata("physPageNumber", "0"))
//!         .unwrap();
//! }
//!
//! let selection = decode_selection(r#"{"b.jpg":1}"#).unwrap();
//! let report = prune(&mut document, &selection, &PruneOptions::default()).unwrap();
//!
//! assert_eq!(report.removed_nodes, ["PHYS_0001"]);
//! assert_eq!(document.physical_nodes()[0].metadata_value("physPageNumber"), Some("1"));
//! ```

mod document;
mod error;
pub mod mets;
mod prune;
mod store;

pub use document::{
    ContentFile, Links, LogicalNode, Metadata, PhysicalNode, PhysicalRoot, StructuralDocument,
};
pub use error::{DocumentError, MetsError, StructuralInconsistencyError};
pub use mets::{parse_mets, write_mets};
pub use prune::{DEFAULT_PAGE_ORDER_FIELD, PruneOptions, PruneReport, prune};
pub use store::{MetsFile, StructureStore};
