//! Ordered name → position mapping.

use rustc_hash::FxHashMap;

use crate::DecodeError;

/// Highest accepted output position.
///
/// Positions size the manifest, so they are capped well above any real page
/// count.
pub const MAX_ORDER: u32 = 100_000;

/// One decoded selection item.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SelectionEntry {
    name: String,
    order: u32,
}

impl SelectionEntry {
    /// Returns the selected image's file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the 1-based output position.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }
}

/// Mapping from selected image names to their output positions.
///
/// Entries keep the order in which they were inserted; lookups by name go
/// through a hash index. Names and positions are both unique.
#[derive(Clone, Debug, Default)]
pub struct SelectionMap {
    entries: Vec<SelectionEntry>,
    by_name: FxHashMap<String, usize>,
    by_order: FxHashMap<u32, usize>,
}

impl SelectionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` at position `order`.
    ///
    /// Rejects a position of zero or above [`MAX_ORDER`], a name that is
    /// already present and a position that is already taken.
    pub fn insert(&mut self, name: impl Into<String>, order: u32) -> Result<(), DecodeError> {
        let name = name.into();
        if order == 0 {
            return Err(DecodeError::InvalidOrder {
                name,
                value: order.to_string(),
            });
        }
        if order > MAX_ORDER {
            return Err(DecodeError::OrderOutOfRange {
                name,
                order,
                max: MAX_ORDER,
            });
        }
        if self.by_name.contains_key(&name) {
            return Err(DecodeError::DuplicateName { name });
        }
        if let Some(&index) = self.by_order.get(&order) {
            return Err(DecodeError::DuplicateOrder {
                order,
                first: self.entries[index].name.clone(),
                second: name,
            });
        }

        let index = self.entries.len();
        self.by_name.insert(name.clone(), index);
        self.by_order.insert(order, index);
        self.entries.push(SelectionEntry { name, order });
        Ok(())
    }

    /// Returns the position assigned to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).map(|&index| self.entries[index].order)
    }

    /// Reports whether `name` is selected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of selected images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest position in the map, or zero when empty.
    #[must_use]
    pub fn max_order(&self) -> u32 {
        self.entries.iter().map(|entry| entry.order).max().unwrap_or(0)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }

    /// Returns the entries sorted by position.
    #[must_use]
    pub fn entries_by_order(&self) -> Vec<&SelectionEntry> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by_key(|entry| entry.order);
        sorted
    }
}

impl PartialEq for SelectionMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|entry| other.get(&entry.name) == Some(entry.order))
    }
}

impl Eq for SelectionMap {}

impl<'a> IntoIterator for &'a SelectionMap {
    type Item = &'a SelectionEntry;
    type IntoIter = std::slice::Iter<'a, SelectionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
