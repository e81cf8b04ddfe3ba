//! Matching a selection against the source folder listing.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::{ResolveError, SelectionMap};

/// An image that is both selected and present in the source folder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedImage {
    name: String,
    source_path: PathBuf,
    discovery_index: usize,
    order: u32,
}

impl ResolvedImage {
    /// File name inside the source folder.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the source file.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Zero-based position among matched files, in listing order.
    #[must_use]
    pub const fn discovery_index(&self) -> usize {
        self.discovery_index
    }

    /// 1-based output position from the selection.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }
}

/// Result of [`resolve_images`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Resolution {
    images: Vec<ResolvedImage>,
    missing: Vec<String>,
}

impl Resolution {
    /// Matched images in listing order.
    #[must_use]
    pub fn images(&self) -> &[ResolvedImage] {
        &self.images
    }

    /// Consumes the resolution, returning the matched images.
    #[must_use]
    pub fn into_images(self) -> Vec<ResolvedImage> {
        self.images
    }

    /// Selected names that were not found in the listing, ordered by position.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Reports whether no selected image was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Matched images sorted by output position.
    #[must_use]
    pub fn by_order(&self) -> Vec<&ResolvedImage> {
        let mut sorted: Vec<_> = self.images.iter().collect();
        sorted.sort_by_key(|image| image.order);
        sorted
    }
}

/// Lists the regular files directly inside `folder`.
///
/// Subdirectories are skipped and names that are not valid UTF-8 are
/// ignored. The returned order is whatever the platform's directory
/// iteration yields.
///
/// # Errors
///
/// Returns [`ResolveError::Listing`] when the folder cannot be read.
pub fn list_source_folder(folder: &Path) -> Result<Vec<String>, ResolveError> {
    let listing_error = |source| ResolveError::Listing {
        path: folder.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(folder).map_err(listing_error)? {
        let entry = entry.map_err(listing_error)?;
        let file_type = entry.file_type().map_err(listing_error)?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                tracing::debug!(target: "export::selection", name = ?raw, "skipping non-UTF-8 file name");
            }
        }
    }
    Ok(names)
}

/// Cross-references `selection` with a folder `listing`.
///
/// Every listed name that is a selection key yields a [`ResolvedImage`]
/// whose source path is `folder/name`. Discovery indices count matches only.
pub fn resolve_images<I>(selection: &SelectionMap, folder: &Path, listing: I) -> Resolution
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut images: Vec<ResolvedImage> = Vec::with_capacity(selection.len());
    let mut matched: FxHashSet<String> = FxHashSet::default();
    for listed in listing {
        let name = listed.as_ref();
        let Some(order) = selection.get(name) else {
            continue;
        };
        if !matched.insert(name.to_owned()) {
            continue;
        }
        images.push(ResolvedImage {
            name: name.to_owned(),
            source_path: folder.join(name),
            discovery_index: images.len(),
            order,
        });
    }

    let missing = selection
        .entries_by_order()
        .into_iter()
        .filter(|entry| !matched.contains(entry.name()))
        .map(|entry| entry.name().to_owned())
        .collect();

    tracing::debug!(
        target: "export::selection",
        matched = images.len(),
        selected = selection.len(),
        "resolved selection against source folder"
    );
    Resolution { images, missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_selection;
    use std::fs::File;

    #[test]
    fn discovery_index_follows_listing_not_selection() {
        let map = decode_selection(r#"{"a.jpg":2,"c.jpg":1}"#).unwrap();
        let resolution = resolve_images(&map, Path::new("/src"), ["a.jpg", "b.jpg", "c.jpg"]);

        let images = resolution.images();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name(), "a.jpg");
        assert_eq!(images[0].order(), 2);
        assert_eq!(images[0].discovery_index(), 0);
        assert_eq!(images[0].source_path(), Path::new("/src/a.jpg"));
        assert_eq!(images[1].name(), "c.jpg");
        assert_eq!(images[1].order(), 1);
        assert_eq!(images[1].discovery_index(), 1);
        assert!(resolution.missing().is_empty());
    }

    #[test]
    fn by_order_sorts_on_selection_position() {
        let map = decode_selection(r#"{"a.jpg":2,"c.jpg":1}"#).unwrap();
        let resolution = resolve_images(&map, Path::new("/src"), ["a.jpg", "c.jpg"]);
        let names: Vec<_> = resolution.by_order().iter().map(|i| i.name()).collect();
        assert_eq!(names, ["c.jpg", "a.jpg"]);
    }

    #[test]
    fn unlisted_selection_entries_are_reported_missing() {
        let map = decode_selection(r#"{"gone.jpg":1,"here.jpg":2,"also-gone.jpg":3}"#).unwrap();
        let resolution = resolve_images(&map, Path::new("/src"), ["here.jpg"]);
        assert_eq!(resolution.images().len(), 1);
        assert_eq!(resolution.missing(), ["gone.jpg", "also-gone.jpg"]);
    }

    #[test]
    fn repeated_listing_names_resolve_once() {
        let map = decode_selection(r#"{"a.jpg":1,"b.jpg":2}"#).unwrap();
        let resolution = resolve_images(&map, Path::new("/img"), ["a.jpg", "a.jpg", "c.jpg"]);

        assert_eq!(resolution.images().len(), 1);
        assert_eq!(resolution.images()[0].discovery_index(), 0);
        assert_eq!(resolution.missing(), ["b.jpg"]);
    }

    #[test]
    fn large_listings_keep_listing_order() {
        let mut map = SelectionMap::new();
        for index in 0..5_000u32 {
            map.insert(format!("{index:08}.jpg"), 5_000 - index).unwrap();
        }
        let listing: Vec<String> = (0..6_000u32).map(|index| format!("{index:08}.jpg")).collect();

        let resolution = resolve_images(&map, Path::new("/img"), &listing);

        assert_eq!(resolution.images().len(), 5_000);
        assert!(resolution.missing().is_empty());
        assert_eq!(resolution.images()[4_999].name(), "00004999.jpg");
        assert_eq!(resolution.images()[4_999].order(), 1);
    }

    #[test]
    fn empty_selection_resolves_nothing() {
        let resolution = resolve_images(&SelectionMap::new(), Path::new("/src"), ["a.jpg"]);
        assert!(resolution.is_empty());
        assert!(resolution.missing().is_empty());
    }

    #[test]
    fn name_matching_is_exact() {
        let map = decode_selection(r#"{"A.JPG":1}"#).unwrap();
        let resolution = resolve_images(&map, Path::new("/src"), ["a.jpg"]);
        assert!(resolution.is_empty());
    }

    #[test]
    fn list_source_folder_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("one.jpg")).unwrap();
        File::create(dir.path().join("two.tif")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let mut names = list_source_folder(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, ["one.jpg", "two.tif"]);
    }

    #[test]
    fn list_source_folder_reports_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let err = list_source_folder(&missing).unwrap_err();
        assert!(err.to_string().contains("absent"));
    }
}
