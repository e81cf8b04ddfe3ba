//! Arena representation of a structural document.
//!
//! Physical pages live in a flat vector; logical divisions live in an index
//! arena where each node records its parent and children by position.
//! References are identifier pairs stored on both endpoints, and file
//! pointers are mirrored between pages and content files, so every mutation
//! goes through [`StructuralDocument`] to keep both sides in step.

use rustc_hash::FxHashMap;

use crate::DocumentError;

/// A named metadata value attached to a physical node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Metadata {
    /// Metadata type name, for example `physPageNumber`.
    pub name: String,
    /// Value in its textual form.
    pub value: String,
}

/// Outgoing and incoming reference endpoints of one node.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Links {
    outgoing: Vec<String>,
    incoming: Vec<String>,
}

impl Links {
    /// Identifiers this node references.
    #[must_use]
    pub fn outgoing(&self) -> &[String] {
        &self.outgoing
    }

    /// Identifiers referencing this node.
    #[must_use]
    pub fn incoming(&self) -> &[String] {
        &self.incoming
    }

    /// Reports whether the node takes part in no reference.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

/// The container node of the physical structure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhysicalRoot {
    id: String,
    kind: String,
    links: Links,
}

impl PhysicalRoot {
    /// Root identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root type, usually `physSequence`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// References touching the root.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }
}

/// One scanned page.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhysicalNode {
    id: String,
    kind: String,
    image_name: String,
    metadata: Vec<Metadata>,
    files: Vec<String>,
    links: Links,
}

impl PhysicalNode {
    /// Creates a page without metadata, files or references.
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        image_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            image_name: image_name.into(),
            metadata: Vec::new(),
            files: Vec::new(),
            links: Links::default(),
        }
    }

    /// Adds a metadata value.
    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(Metadata {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Node identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Node type, usually `page`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// File name of the image shown on this page.
    #[must_use]
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    /// All metadata values in insertion order.
    #[must_use]
    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// First value of the metadata named `name`.
    #[must_use]
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    /// Identifiers of the content files this page points to.
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// References touching this page.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut Vec<Metadata> {
        &mut self.metadata
    }
}

/// A logical division such as a chapter or the work itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogicalNode {
    id: String,
    kind: String,
    label: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
    links: Links,
}

impl LogicalNode {
    /// Creates a logical node without a label.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: None,
            parent: None,
            children: Vec::new(),
            links: Links::default(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Node identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Division type.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Arena position of the parent division.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Arena positions of the child divisions, in document order.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// References touching this division.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }
}

/// An on-disk file listed by the document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentFile {
    id: String,
    group: String,
    mime_type: String,
    location: String,
    referenced_by: Vec<String>,
}

impl ContentFile {
    /// Creates a content file entry.
    pub fn new(
        id: impl Into<String>,
        group: impl Into<String>,
        mime_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            mime_type: mime_type.into(),
            location: location.into(),
            referenced_by: Vec::new(),
        }
    }

    /// File identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// File group (`USE`), for example `LOCAL`.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File location as stored in the document.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Identifiers of the pages pointing at this file.
    #[must_use]
    pub fn referenced_by(&self) -> &[String] {
        &self.referenced_by
    }

    pub(crate) fn referenced_by_mut(&mut self) -> &mut Vec<String> {
        &mut self.referenced_by
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
    Root,
    Physical(usize),
    Logical(usize),
}

/// A document's physical pages, logical divisions and content files.
#[derive(Clone, Debug, Default)]
pub struct StructuralDocument {
    physical_root: Option<PhysicalRoot>,
    physical: Vec<PhysicalNode>,
    logical: Vec<LogicalNode>,
    files: Vec<ContentFile>,
    nodes: FxHashMap<String, Slot>,
    file_index: FxHashMap<String, usize>,
}

impl StructuralDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the physical container node.
    pub fn set_physical_root(
        &mut self,
        id: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let id = id.into();
        if matches!(self.nodes.get(&id), Some(slot) if *slot != Slot::Root) {
            return Err(DocumentError::DuplicateId { id });
        }
        if let Some(previous) = self.physical_root.take() {
            self.nodes.remove(&previous.id);
        }
        self.nodes.insert(id.clone(), Slot::Root);
        self.physical_root = Some(PhysicalRoot {
            id,
            kind: kind.into(),
            links: Links::default(),
        });
        Ok(())
    }

    /// The physical container node, when present.
    #[must_use]
    pub const fn physical_root(&self) -> Option<&PhysicalRoot> {
        self.physical_root.as_ref()
    }

    /// Appends a page. Its references and file pointers must be added
    /// through [`link`](Self::link) and [`attach_file`](Self::attach_file).
    pub fn add_physical(&mut self, mut node: PhysicalNode) -> Result<(), DocumentError> {
        self.claim_node_id(&node.id, Slot::Physical(self.physical.len()))?;
        node.files.clear();
        node.links = Links::default();
        self.physical.push(node);
        Ok(())
    }

    /// Appends a logical division under `parent`, or as a root when `None`.
    pub fn add_logical(
        &mut self,
        mut node: LogicalNode,
        parent: Option<&str>,
    ) -> Result<(), DocumentError> {
        let parent_index = match parent {
            Some(parent_id) => match self.nodes.get(parent_id) {
                Some(Slot::Logical(index)) => Some(*index),
                _ => {
                    return Err(DocumentError::UnknownNode {
                        id: parent_id.to_owned(),
                    });
                }
            },
            None => None,
        };

        let index = self.logical.len();
        self.claim_node_id(&node.id, Slot::Logical(index))?;
        node.parent = parent_index;
        node.children.clear();
        node.links = Links::default();
        self.logical.push(node);
        if let Some(parent_index) = parent_index {
            self.logical[parent_index].children.push(index);
        }
        Ok(())
    }

    /// Appends a content file.
    pub fn add_file(&mut self, mut file: ContentFile) -> Result<(), DocumentError> {
        if self.file_index.contains_key(&file.id) {
            return Err(DocumentError::DuplicateId { id: file.id });
        }
        file.referenced_by.clear();
        self.file_index.insert(file.id.clone(), self.files.len());
        self.files.push(file);
        Ok(())
    }

    /// Records a reference from `from` to `to` on both endpoints.
    ///
    /// Adding an existing reference again has no effect.
    pub fn link(&mut self, from: &str, to: &str) -> Result<(), DocumentError> {
        for id in [from, to] {
            if !self.nodes.contains_key(id) {
                return Err(DocumentError::UnknownNode { id: id.to_owned() });
            }
        }
        if let Some(links) = self.links_mut(from) {
            if links.outgoing.iter().any(|target| target == to) {
                return Ok(());
            }
            links.outgoing.push(to.to_owned());
        }
        if let Some(links) = self.links_mut(to) {
            links.incoming.push(from.to_owned());
        }
        Ok(())
    }

    /// Removes the reference from `from` to `to` on both endpoints.
    ///
    /// Returns whether the reference existed.
    pub fn unlink(&mut self, from: &str, to: &str) -> bool {
        let removed_outgoing = self
            .links_mut(from)
            .is_some_and(|links| remove_id(&mut links.outgoing, to));
        let removed_incoming = self
            .links_mut(to)
            .is_some_and(|links| remove_id(&mut links.incoming, from));
        removed_outgoing || removed_incoming
    }

    /// Points page `node` at content file `file`, mirrored on the file.
    pub fn attach_file(&mut self, node: &str, file: &str) -> Result<(), DocumentError> {
        let Some(&file_index) = self.file_index.get(file) else {
            return Err(DocumentError::UnknownFile { id: file.to_owned() });
        };
        let Some(Slot::Physical(node_index)) = self.nodes.get(node).copied() else {
            return Err(DocumentError::UnknownNode { id: node.to_owned() });
        };

        let page = &mut self.physical[node_index];
        if !page.files.iter().any(|existing| existing == file) {
            page.files.push(file.to_owned());
            self.files[file_index].referenced_by.push(node.to_owned());
        }
        Ok(())
    }

    /// Pages in document order.
    #[must_use]
    pub fn physical_nodes(&self) -> &[PhysicalNode] {
        &self.physical
    }

    /// Looks up a page by identifier.
    #[must_use]
    pub fn physical(&self, id: &str) -> Option<&PhysicalNode> {
        match self.nodes.get(id) {
            Some(Slot::Physical(index)) => self.physical.get(*index),
            _ => None,
        }
    }

    /// Logical divisions in arena order (parents before children).
    #[must_use]
    pub fn logical_nodes(&self) -> &[LogicalNode] {
        &self.logical
    }

    /// Looks up a logical division by identifier.
    #[must_use]
    pub fn logical(&self, id: &str) -> Option<&LogicalNode> {
        match self.nodes.get(id) {
            Some(Slot::Logical(index)) => self.logical.get(*index),
            _ => None,
        }
    }

    /// Logical divisions without a parent.
    pub fn logical_roots(&self) -> impl Iterator<Item = &LogicalNode> {
        self.logical.iter().filter(|node| node.parent.is_none())
    }

    /// Content files in document order.
    #[must_use]
    pub fn content_files(&self) -> &[ContentFile] {
        &self.files
    }

    /// Looks up a content file by identifier.
    #[must_use]
    pub fn content_file(&self, id: &str) -> Option<&ContentFile> {
        self.file_index.get(id).map(|&index| &self.files[index])
    }

    /// Reports whether `id` names a node of any kind.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Links of the node named `id`.
    #[must_use]
    pub fn links(&self, id: &str) -> Option<&Links> {
        match self.nodes.get(id)? {
            Slot::Root => self.physical_root.as_ref().map(|root| &root.links),
            Slot::Physical(index) => self.physical.get(*index).map(|node| &node.links),
            Slot::Logical(index) => self.logical.get(*index).map(|node| &node.links),
        }
    }

    /// Every reference as a `(from, to)` pair, logical sources first.
    #[must_use]
    pub fn references(&self) -> Vec<(String, String)> {
        let logical = self.logical.iter().map(|node| (&node.id, &node.links));
        let root = self.physical_root.iter().map(|root| (&root.id, &root.links));
        let physical = self.physical.iter().map(|node| (&node.id, &node.links));

        logical
            .chain(root)
            .chain(physical)
            .flat_map(|(id, links)| {
                links
                    .outgoing
                    .iter()
                    .map(move |target| (id.clone(), target.clone()))
            })
            .collect()
    }

    /// References or file pointers whose endpoints disagree.
    ///
    /// Each entry is a `(from, to)` pair: either endpoint is missing from the
    /// document, or only one side records the relation. An empty result
    /// means the document is internally consistent.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        let mut dangling = Vec::new();
        let endpoints = self
            .logical
            .iter()
            .map(|node| (&node.id, &node.links))
            .chain(self.physical_root.iter().map(|root| (&root.id, &root.links)))
            .chain(self.physical.iter().map(|node| (&node.id, &node.links)));

        for (id, links) in endpoints {
            for target in &links.outgoing {
                let mirrored = self
                    .links(target)
                    .is_some_and(|other| other.incoming.contains(id));
                if !mirrored {
                    dangling.push((id.clone(), target.clone()));
                }
            }
            for source in &links.incoming {
                let mirrored = self
                    .links(source)
                    .is_some_and(|other| other.outgoing.contains(id));
                if !mirrored {
                    dangling.push((source.clone(), id.clone()));
                }
            }
        }

        for page in &self.physical {
            for file in &page.files {
                let mirrored = self
                    .content_file(file)
                    .is_some_and(|entry| entry.referenced_by.contains(&page.id));
                if !mirrored {
                    dangling.push((page.id.clone(), file.clone()));
                }
            }
        }
        for file in &self.files {
            for page in &file.referenced_by {
                let mirrored = self
                    .physical(page)
                    .is_some_and(|node| node.files.contains(&file.id));
                if !mirrored {
                    dangling.push((page.clone(), file.id.clone()));
                }
            }
        }
        dangling
    }

    pub(crate) fn physical_mut(&mut self) -> &mut Vec<PhysicalNode> {
        &mut self.physical
    }

    pub(crate) fn files_mut(&mut self) -> &mut Vec<ContentFile> {
        &mut self.files
    }

    /// Rebuilds the identifier indexes after pages or files were removed or
    /// reordered.
    pub(crate) fn reindex(&mut self) {
        self.nodes.clear();
        if let Some(root) = &self.physical_root {
            self.nodes.insert(root.id.clone(), Slot::Root);
        }
        for (index, node) in self.physical.iter().enumerate() {
            self.nodes.insert(node.id.clone(), Slot::Physical(index));
        }
        for (index, node) in self.logical.iter().enumerate() {
            self.nodes.insert(node.id.clone(), Slot::Logical(index));
        }
        self.file_index.clear();
        for (index, file) in self.files.iter().enumerate() {
            self.file_index.insert(file.id.clone(), index);
        }
    }

    fn claim_node_id(&mut self, id: &str, slot: Slot) -> Result<(), DocumentError> {
        if self.nodes.contains_key(id) {
            return Err(DocumentError::DuplicateId { id: id.to_owned() });
        }
        self.nodes.insert(id.to_owned(), slot);
        Ok(())
    }

    fn links_mut(&mut self, id: &str) -> Option<&mut Links> {
        match *self.nodes.get(id)? {
            Slot::Root => self.physical_root.as_mut().map(|root| &mut root.links),
            Slot::Physical(index) => self.physical.get_mut(index).map(|node| &mut node.links),
            Slot::Logical(index) => self.logical.get_mut(index).map(|node| &mut node.links),
        }
    }
}

fn remove_id(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuralDocument {
        let mut document = StructuralDocument::new();
        document.set_physical_root("PHYS_0000", "physSequence").unwrap();
        document
            .add_logical(LogicalNode::new("LOG_0000", "Monograph"), None)
            .unwrap();
        document
            .add_logical(
                LogicalNode::new("LOG_0001", "Chapter").with_label("One"),
                Some("LOG_0000"),
            )
            .unwrap();
        document
            .add_physical(
                PhysicalNode::new("PHYS_0001", "page", "00000001.jpg")
                    .with_metadata("physPageNumber", "1"),
            )
            .unwrap();
        document
            .add_file(ContentFile::new(
                "FILE_0001",
                "LOCAL",
                "image/jpeg",
                "file:///images/00000001.jpg",
            ))
            .unwrap();
        document.attach_file("PHYS_0001", "FILE_0001").unwrap();
        document.link("LOG_0000", "PHYS_0000").unwrap();
        document.link("LOG_0001", "PHYS_0001").unwrap();
        document
    }

    #[test]
    fn link_is_recorded_on_both_endpoints() {
        let document = sample();
        let chapter = document.logical("LOG_0001").unwrap();
        let page = document.physical("PHYS_0001").unwrap();
        assert_eq!(chapter.links().outgoing(), ["PHYS_0001"]);
        assert_eq!(page.links().incoming(), ["LOG_0001"]);
        assert!(document.dangling_references().is_empty());
    }

    #[test]
    fn link_twice_is_a_no_op() {
        let mut document = sample();
        document.link("LOG_0001", "PHYS_0001").unwrap();
        assert_eq!(document.references().len(), 2);
    }

    #[test]
    fn unlink_updates_both_endpoints() {
        let mut document = sample();
        assert!(document.unlink("LOG_0001", "PHYS_0001"));
        assert!(!document.unlink("LOG_0001", "PHYS_0001"));
        assert!(document.physical("PHYS_0001").unwrap().links().is_empty());
        assert!(document.logical("LOG_0001").unwrap().links().is_empty());
    }

    #[test]
    fn references_list_pairs() {
        let document = sample();
        assert_eq!(
            document.references(),
            [
                ("LOG_0000".to_owned(), "PHYS_0000".to_owned()),
                ("LOG_0001".to_owned(), "PHYS_0001".to_owned()),
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut document = sample();
        let err = document
            .add_physical(PhysicalNode::new("LOG_0001", "page", "x.jpg"))
            .unwrap_err();
        assert_eq!(
            err,
            DocumentError::DuplicateId {
                id: "LOG_0001".to_owned()
            }
        );
        assert!(
            document
                .add_file(ContentFile::new("FILE_0001", "LOCAL", "image/jpeg", "x"))
                .is_err()
        );
    }

    #[test]
    fn unknown_endpoints_are_rejected() {
        let mut document = sample();
        assert!(matches!(
            document.link("LOG_0001", "PHYS_9999"),
            Err(DocumentError::UnknownNode { .. })
        ));
        assert!(matches!(
            document.attach_file("PHYS_0001", "FILE_9999"),
            Err(DocumentError::UnknownFile { .. })
        ));
        assert!(matches!(
            document.add_logical(LogicalNode::new("LOG_0009", "Chapter"), Some("PHYS_0001")),
            Err(DocumentError::UnknownNode { .. })
        ));
    }

    #[test]
    fn logical_tree_keeps_parent_and_children() {
        let document = sample();
        let root = document.logical("LOG_0000").unwrap();
        assert_eq!(root.children(), [1]);
        assert_eq!(document.logical_nodes()[1].parent(), Some(0));
        assert_eq!(document.logical_roots().count(), 1);
    }

    #[test]
    fn file_pointers_are_mirrored() {
        let document = sample();
        assert_eq!(
            document.content_file("FILE_0001").unwrap().referenced_by(),
            ["PHYS_0001"]
        );
        assert_eq!(document.physical("PHYS_0001").unwrap().files(), ["FILE_0001"]);
    }
}
