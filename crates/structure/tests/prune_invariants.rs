//! Property tests for selection-driven pruning.

use std::collections::BTreeSet;

use proptest::prelude::*;
use selection::SelectionMap;
use structure::{
    ContentFile, LogicalNode, PhysicalNode, PruneOptions, StructuralDocument, prune,
};

#[derive(Clone, Debug)]
struct Shape {
    pages: usize,
    divisions: usize,
    links: Vec<(usize, usize)>,
    shared_files: Vec<Vec<usize>>,
    selected: Vec<usize>,
}

fn image(page: usize) -> String {
    format!("{page:08}.jpg")
}

fn shape() -> impl Strategy<Value = Shape> {
    (1usize..=10, 1usize..=4).prop_flat_map(|(pages, divisions)| {
        (
            Just(pages),
            Just(divisions),
            prop::collection::vec((0..divisions, 0..pages), 0..=16),
            prop::collection::vec(prop::collection::vec(0..pages, 1..=3), 0..=3),
            prop::sample::subsequence((0..pages).collect::<Vec<_>>(), 0..=pages)
                .prop_shuffle(),
        )
            .prop_map(|(pages, divisions, links, shared_files, selected)| Shape {
                pages,
                divisions,
                links,
                shared_files,
                selected,
            })
    })
}

fn build(shape: &Shape) -> (StructuralDocument, SelectionMap) {
    let mut document = StructuralDocument::new();
    document.set_physical_root("PHYS_ROOT", "physSequence").unwrap();
    for division in 0..shape.divisions {
        let parent = division.checked_sub(1).map(|p| format!("LOG_{p}"));
        document
            .add_logical(
                LogicalNode::new(format!("LOG_{division}"), "Chapter"),
                parent.as_deref(),
            )
            .unwrap();
    }
    document.link("LOG_0", "PHYS_ROOT").unwrap();

    for page in 0..shape.pages {
        document
            .add_physical(
                PhysicalNode::new(format!("PHYS_{page}"), "page", image(page))
                    .with_metadata("physPageNumber", (page + 1).to_string()),
            )
            .unwrap();
        document
            .add_file(ContentFile::new(
                format!("FILE_{page}"),
                "LOCAL",
                "image/jpeg",
                image(page),
            ))
            .unwrap();
        document
            .attach_file(&format!("PHYS_{page}"), &format!("FILE_{page}"))
            .unwrap();
    }
    for (index, pages) in shape.shared_files.iter().enumerate() {
        let id = format!("SHARED_{index}");
        document
            .add_file(ContentFile::new(id.as_str(), "PRESENTATION", "image/tiff", "x.tif"))
            .unwrap();
        for page in pages {
            document.attach_file(&format!("PHYS_{page}"), &id).unwrap();
        }
    }
    for (division, page) in &shape.links {
        document
            .link(&format!("LOG_{division}"), &format!("PHYS_{page}"))
            .unwrap();
    }

    let mut selection = SelectionMap::new();
    for (position, page) in shape.selected.iter().enumerate() {
        selection.insert(image(*page), position as u32 + 1).unwrap();
    }
    (document, selection)
}

proptest! {
    /// Property: after pruning, pages equal the selected intersection, carry
    /// their selected position and leave no dangling reference.
    #[test]
    fn pruned_document_satisfies_invariants(shape in shape()) {
        let (mut document, selection) = build(&shape);
        let original: BTreeSet<String> = document
            .physical_nodes()
            .iter()
            .map(|page| page.image_name().to_owned())
            .collect();

        prune(&mut document, &selection, &PruneOptions::default()).unwrap();

        let remaining: BTreeSet<String> = document
            .physical_nodes()
            .iter()
            .map(|page| page.image_name().to_owned())
            .collect();
        let expected: BTreeSet<String> = selection
            .iter()
            .map(|entry| entry.name().to_owned())
            .filter(|name| original.contains(name))
            .collect();
        prop_assert_eq!(remaining, expected);

        for page in document.physical_nodes() {
            let order = selection.get(page.image_name()).unwrap();
            let expected_order = order.to_string();
            prop_assert_eq!(page.metadata_value("physPageNumber"), Some(expected_order.as_str()));
        }
        let orders: Vec<u32> = document
            .physical_nodes()
            .iter()
            .filter_map(|page| selection.get(page.image_name()))
            .collect();
        prop_assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));

        prop_assert!(document.dangling_references().is_empty());
        for file in document.content_files() {
            for page in file.referenced_by() {
                prop_assert!(document.physical(page).is_some());
            }
        }
        prop_assert_eq!(document.logical_nodes().len(), shape.divisions);
    }

    /// Property: pruning an already pruned document changes nothing.
    #[test]
    fn pruning_is_idempotent(shape in shape()) {
        let (mut document, selection) = build(&shape);
        prune(&mut document, &selection, &PruneOptions::default()).unwrap();
        let pages = document.physical_nodes().to_vec();
        let files = document.content_files().to_vec();
        let references = document.references();

        let report = prune(&mut document, &selection, &PruneOptions::default()).unwrap();

        prop_assert!(report.is_noop());
        prop_assert_eq!(document.physical_nodes(), pages.as_slice());
        prop_assert_eq!(document.content_files(), files.as_slice());
        prop_assert_eq!(document.references(), references);
    }
}
