//! Selection-driven pruning of a structural document.

use rustc_hash::FxHashSet;
use selection::SelectionMap;

use crate::{StructuralDocument, StructuralInconsistencyError};

/// Metadata name holding a page's physical order.
pub const DEFAULT_PAGE_ORDER_FIELD: &str = "physPageNumber";

/// Options for [`prune`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PruneOptions {
    page_order_field: String,
}

impl PruneOptions {
    /// Uses `field` as the page-order metadata name.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            page_order_field: field.into(),
        }
    }

    /// The page-order metadata name.
    #[must_use]
    pub fn page_order_field(&self) -> &str {
        &self.page_order_field
    }
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_ORDER_FIELD)
    }
}

/// Summary of what [`prune`] changed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PruneReport {
    /// Number of pages kept.
    pub retained: usize,
    /// Identifiers of removed pages, in document order.
    pub removed_nodes: Vec<String>,
    /// Number of references deleted.
    pub removed_references: usize,
    /// Identifiers of removed content files.
    pub removed_files: Vec<String>,
}

impl PruneReport {
    /// Reports whether the document was left unchanged apart from
    /// page-order values.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.removed_nodes.is_empty()
            && self.removed_references == 0
            && self.removed_files.is_empty()
    }
}

/// Restricts `document` to the pages whose image is in `selection`.
///
/// Pages whose image name is not selected are removed together with every
/// reference touching them. Retained pages get their page-order metadata
/// overwritten with the selected position and are reordered by it. Content
/// files referenced only by removed pages are dropped; surviving files forget
/// the removed pages. The logical tree keeps its shape.
///
/// All decisions are made before the document is touched, so on error the
/// document is unchanged.
///
/// # Errors
///
/// Returns [`StructuralInconsistencyError`] when a retained page does not
/// carry exactly one page-order value.
pub fn prune(
    document: &mut StructuralDocument,
    selection: &SelectionMap,
    options: &PruneOptions,
) -> Result<PruneReport, StructuralInconsistencyError> {
    let field = options.page_order_field();

    let mut renumber = Vec::new();
    let mut removed = FxHashSet::default();
    let mut removed_nodes = Vec::new();
    for (index, node) in document.physical_nodes().iter().enumerate() {
        let Some(order) = selection.get(node.image_name()) else {
            removed.insert(node.id().to_owned());
            removed_nodes.push(node.id().to_owned());
            continue;
        };

        let count = node
            .metadata()
            .iter()
            .filter(|entry| entry.name == field)
            .count();
        match count {
            1 => renumber.push((index, order)),
            0 => {
                return Err(StructuralInconsistencyError::MissingPageOrder {
                    node: node.id().to_owned(),
                    field: field.to_owned(),
                });
            }
            count => {
                return Err(StructuralInconsistencyError::AmbiguousPageOrder {
                    node: node.id().to_owned(),
                    field: field.to_owned(),
                    count,
                });
            }
        }
    }

    let removed_files: Vec<String> = document
        .content_files()
        .iter()
        .filter(|file| {
            !file.referenced_by().is_empty()
                && file.referenced_by().iter().all(|page| removed.contains(page))
        })
        .map(|file| file.id().to_owned())
        .collect();

    let mut removed_references = 0;
    for id in &removed_nodes {
        let Some(links) = document.links(id) else {
            continue;
        };
        let pairs: Vec<(String, String)> = links
            .outgoing()
            .iter()
            .map(|target| (id.clone(), target.clone()))
            .chain(
                links
                    .incoming()
                    .iter()
                    .map(|source| (source.clone(), id.clone())),
            )
            .collect();
        for (from, to) in pairs {
            if document.unlink(&from, &to) {
                removed_references += 1;
            }
        }
    }

    for (index, order) in renumber {
        let value = order.to_string();
        if let Some(entry) = document.physical_mut()[index]
            .metadata_mut()
            .iter_mut()
            .find(|entry| entry.name == field)
        {
            entry.value = value;
        }
    }

    let doomed: FxHashSet<&str> = removed_files.iter().map(String::as_str).collect();
    let files = document.files_mut();
    files.retain(|file| !doomed.contains(file.id()));
    for file in files.iter_mut() {
        file.referenced_by_mut().retain(|page| !removed.contains(page));
    }

    let pages = document.physical_mut();
    pages.retain(|node| !removed.contains(node.id()));
    pages.sort_by_key(|node| selection.get(node.image_name()).unwrap_or(u32::MAX));
    document.reindex();

    let report = PruneReport {
        retained: document.physical_nodes().len(),
        removed_nodes,
        removed_references,
        removed_files,
    };
    tracing::debug!(
        target: "export::structure",
        retained = report.retained,
        removed = report.removed_nodes.len(),
        references = report.removed_references,
        files = report.removed_files.len(),
        "pruned structural document"
    );
    Ok(report)
}
