use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::{METS_NAMESPACE, ORDER_LABEL_METADATA, ORDER_METADATA, XLINK_NAMESPACE};
use crate::{LogicalNode, StructuralDocument};

/// Serialises `document` as a METS document.
///
/// Files are grouped by `USE` in order of first appearance. Pages are written
/// in their current order, so a pruned document's `ORDER` values ascend.
#[must_use]
pub fn write_mets(document: &StructuralDocument) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<mets:mets xmlns:mets=\"{METS_NAMESPACE}\" xmlns:xlink=\"{XLINK_NAMESPACE}\">"
    );

    write_file_section(&mut out, document);
    write_logical_map(&mut out, document);
    write_physical_map(&mut out, document);
    write_links(&mut out, document);

    out.push_str("</mets:mets>\n");
    out
}

fn write_file_section(out: &mut String, document: &StructuralDocument) {
    let files = document.content_files();
    if files.is_empty() {
        return;
    }

    let mut groups: Vec<&str> = Vec::new();
    for file in files {
        if !groups.contains(&file.group()) {
            groups.push(file.group());
        }
    }

    out.push_str("  <mets:fileSec>\n");
    for group in groups {
        let _ = writeln!(out, "    <mets:fileGrp USE=\"{}\">", escape(group));
        for file in files.iter().filter(|file| file.group() == group) {
            let _ = writeln!(
                out,
                "      <mets:file ID=\"{}\" MIMETYPE=\"{}\">",
                escape(file.id()),
                escape(file.mime_type())
            );
            let _ = writeln!(
                out,
                "        <mets:FLocat LOCTYPE=\"URL\" xlink:href=\"{}\"/>",
                escape(file.location())
            );
            out.push_str("      </mets:file>\n");
        }
        out.push_str("    </mets:fileGrp>\n");
    }
    out.push_str("  </mets:fileSec>\n");
}

fn write_logical_map(out: &mut String, document: &StructuralDocument) {
    if document.logical_nodes().is_empty() {
        return;
    }
    out.push_str("  <mets:structMap TYPE=\"LOGICAL\">\n");
    for root in document.logical_roots() {
        write_logical_div(out, document, root, 2);
    }
    out.push_str("  </mets:structMap>\n");
}

fn write_logical_div(
    out: &mut String,
    document: &StructuralDocument,
    node: &LogicalNode,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    let _ = write!(
        out,
        "{indent}<mets:div ID=\"{}\" TYPE=\"{}\"",
        escape(node.id()),
        escape(node.kind())
    );
    if let Some(label) = node.label() {
        let _ = write!(out, " LABEL=\"{}\"", escape(label));
    }
    if node.children().is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for &child in node.children() {
        if let Some(child) = document.logical_nodes().get(child) {
            write_logical_div(out, document, child, depth + 1);
        }
    }
    let _ = writeln!(out, "{indent}</mets:div>");
}

fn write_physical_map(out: &mut String, document: &StructuralDocument) {
    let pages = document.physical_nodes();
    let root = document.physical_root();
    if root.is_none() && pages.is_empty() {
        return;
    }

    out.push_str("  <mets:structMap TYPE=\"PHYSICAL\">\n");
    let (root_id, root_kind) = root.map_or(("PHYS_0000", "physSequence"), |root| {
        (root.id(), root.kind())
    });
    let _ = write!(
        out,
        "    <mets:div ID=\"{}\" TYPE=\"{}\"",
        escape(root_id),
        escape(root_kind)
    );
    if pages.is_empty() {
        out.push_str("/>\n");
    } else {
        out.push_str(">\n");
        for page in pages {
            let _ = write!(out, "      <mets:div ID=\"{}\"", escape(page.id()));
            if let Some(order) = page.metadata_value(ORDER_METADATA) {
                let _ = write!(out, " ORDER=\"{}\"", escape(order));
            }
            if let Some(label) = page.metadata_value(ORDER_LABEL_METADATA) {
                let _ = write!(out, " ORDERLABEL=\"{}\"", escape(label));
            }
            let _ = write!(out, " TYPE=\"{}\"", escape(page.kind()));
            if page.files().is_empty() {
                out.push_str("/>\n");
                continue;
            }
            out.push_str(">\n");
            for file in page.files() {
                let _ = writeln!(out, "        <mets:fptr FILEID=\"{}\"/>", escape(file));
            }
            out.push_str("      </mets:div>\n");
        }
        out.push_str("    </mets:div>\n");
    }
    out.push_str("  </mets:structMap>\n");
}

fn write_links(out: &mut String, document: &StructuralDocument) {
    let references = document.references();
    if references.is_empty() {
        return;
    }
    out.push_str("  <mets:structLink>\n");
    for (from, to) in &references {
        let _ = writeln!(
            out,
            "    <mets:smLink xlink:from=\"{}\" xlink:to=\"{}\"/>",
            escape(from),
            escape(to)
        );
    }
    out.push_str("  </mets:structLink>\n");
}
