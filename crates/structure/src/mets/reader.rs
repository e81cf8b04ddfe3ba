use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::{ORDER_LABEL_METADATA, ORDER_METADATA, location_file_name};
use crate::{ContentFile, LogicalNode, MetsError, PhysicalNode, StructuralDocument};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    None,
    Physical,
    Logical,
    Other,
}

struct PendingFile {
    id: String,
    group: String,
    mime_type: String,
    location: Option<String>,
}

struct PendingPage {
    id: String,
    kind: String,
    order: Option<String>,
    order_label: Option<String>,
    files: Vec<String>,
}

/// Attribute values of one element, keyed by local name.
struct Attributes(Vec<(Vec<u8>, String)>);

impl Attributes {
    fn of(element: &BytesStart<'_>) -> Result<Self, MetsError> {
        let mut values = Vec::new();
        for attr in element.attributes().flatten() {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw)?.into_owned();
            values.push((local_name(attr.key.as_ref()).to_vec(), value));
        }
        Ok(Self(values))
    }

    fn get(&self, key: &[u8]) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn require(&self, element: &str, key: &[u8]) -> Result<String, MetsError> {
        self.get(key).map(str::to_owned).ok_or_else(|| {
            MetsError::Malformed(format!(
                "<{element}> lacks attribute {}",
                String::from_utf8_lossy(key)
            ))
        })
    }
}

fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map_or(name, |i| &name[i + 1..])
}

/// Parses the modelled subset of a METS document.
///
/// # Errors
///
/// Returns [`MetsError`] for malformed XML, missing identifiers, duplicate
/// identifiers and file pointers naming unknown files.
pub fn parse_mets(content: &str) -> Result<StructuralDocument, MetsError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut document = StructuralDocument::new();
    let mut files: Vec<ContentFile> = Vec::new();
    let mut pages: Vec<PendingPage> = Vec::new();
    let mut links: Vec<(String, String)> = Vec::new();

    let mut section = Section::None;
    let mut group: Option<String> = None;
    let mut file: Option<PendingFile> = None;
    let mut physical_depth = 0usize;
    let mut page: Option<PendingPage> = None;
    let mut logical_stack: Vec<String> = Vec::new();

    loop {
        let event = reader.read_event()?;
        let (element, is_empty) = match &event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"fileGrp" => group = None,
                    b"file" => {
                        if let Some(pending) = file.take() {
                            files.push(finish_file(pending)?);
                        }
                    }
                    b"structMap" => section = Section::None,
                    b"div" => match section {
                        Section::Physical => {
                            if physical_depth == 2
                                && let Some(pending) = page.take()
                            {
                                pages.push(pending);
                            }
                            physical_depth = physical_depth.saturating_sub(1);
                        }
                        Section::Logical => {
                            logical_stack.pop();
                        }
                        Section::None | Section::Other => {}
                    },
                    _ => {}
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = element.name();
        match local_name(name.as_ref()) {
            b"fileGrp" => {
                let attrs = Attributes::of(element)?;
                group = Some(attrs.get(b"USE").unwrap_or_default().to_owned());
            }
            b"file" => {
                let attrs = Attributes::of(element)?;
                let pending = PendingFile {
                    id: attrs.require("file", b"ID")?,
                    group: group.clone().unwrap_or_default(),
                    mime_type: attrs.get(b"MIMETYPE").unwrap_or_default().to_owned(),
                    location: None,
                };
                if is_empty {
                    files.push(finish_file(pending)?);
                } else {
                    file = Some(pending);
                }
            }
            b"FLocat" => {
                let attrs = Attributes::of(element)?;
                if let Some(pending) = file.as_mut()
                    && pending.location.is_none()
                {
                    pending.location = attrs.get(b"href").map(str::to_owned);
                }
            }
            b"structMap" => {
                let attrs = Attributes::of(element)?;
                section = match attrs.get(b"TYPE") {
                    Some(kind) if kind.eq_ignore_ascii_case("PHYSICAL") => Section::Physical,
                    Some(kind) if kind.eq_ignore_ascii_case("LOGICAL") => Section::Logical,
                    _ => Section::Other,
                };
                physical_depth = 0;
                logical_stack.clear();
                if is_empty {
                    section = Section::None;
                }
            }
            b"div" if section == Section::Physical => {
                let attrs = Attributes::of(element)?;
                let depth = physical_depth + 1;
                match depth {
                    1 => {
                        let kind = attrs.get(b"TYPE").unwrap_or("physSequence");
                        document.set_physical_root(attrs.require("div", b"ID")?, kind)?;
                    }
                    2 => {
                        let pending = PendingPage {
                            id: attrs.require("div", b"ID")?,
                            kind: attrs.get(b"TYPE").unwrap_or("page").to_owned(),
                            order: attrs.get(b"ORDER").map(str::to_owned),
                            order_label: attrs.get(b"ORDERLABEL").map(str::to_owned),
                            files: Vec::new(),
                        };
                        if is_empty {
                            pages.push(pending);
                        } else {
                            page = Some(pending);
                        }
                    }
                    _ => {
                        tracing::debug!(
                            target: "export::structure",
                            depth,
                            "ignoring nested physical division"
                        );
                    }
                }
                if !is_empty {
                    physical_depth = depth;
                }
            }
            b"div" if section == Section::Logical => {
                let attrs = Attributes::of(element)?;
                let id = attrs.require("div", b"ID")?;
                let mut node = LogicalNode::new(id.as_str(), attrs.get(b"TYPE").unwrap_or_default());
                if let Some(label) = attrs.get(b"LABEL") {
                    node = node.with_label(label);
                }
                document.add_logical(node, logical_stack.last().map(String::as_str))?;
                if !is_empty {
                    logical_stack.push(id);
                }
            }
            b"fptr" if section == Section::Physical => {
                let attrs = Attributes::of(element)?;
                if let Some(pending) = page.as_mut() {
                    pending.files.push(attrs.require("fptr", b"FILEID")?);
                }
            }
            b"smLink" => {
                let attrs = Attributes::of(element)?;
                links.push((
                    attrs.require("smLink", b"from")?,
                    attrs.require("smLink", b"to")?,
                ));
            }
            _ => {}
        }
    }

    for file in files {
        document.add_file(file)?;
    }
    for pending in pages {
        let image_name = pending
            .files
            .first()
            .and_then(|id| document.content_file(id))
            .map(|file| location_file_name(file.location()).to_owned())
            .unwrap_or_default();
        let mut node = PhysicalNode::new(pending.id.as_str(), pending.kind, image_name);
        if let Some(order) = pending.order {
            node = node.with_metadata(ORDER_METADATA, order);
        }
        if let Some(label) = pending.order_label {
            node = node.with_metadata(ORDER_LABEL_METADATA, label);
        }
        document.add_physical(node)?;
        for file_id in &pending.files {
            document.attach_file(&pending.id, file_id)?;
        }
    }
    for (from, to) in links {
        if document.contains_node(&from) && document.contains_node(&to) {
            document.link(&from, &to)?;
        } else {
            tracing::warn!(
                target: "export::structure",
                %from,
                %to,
                "skipping link with unknown endpoint"
            );
        }
    }

    tracing::debug!(
        target: "export::structure",
        pages = document.physical_nodes().len(),
        divisions = document.logical_nodes().len(),
        files = document.content_files().len(),
        "parsed METS document"
    );
    Ok(document)
}

fn finish_file(pending: PendingFile) -> Result<ContentFile, MetsError> {
    let location = pending.location.ok_or_else(|| {
        MetsError::Malformed(format!("<file ID=\"{}\"> has no FLocat href", pending.id))
    })?;
    Ok(ContentFile::new(
        pending.id,
        pending.group,
        pending.mime_type,
        location,
    ))
}
