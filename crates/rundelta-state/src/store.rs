//! Element store - ordered collection of element entries

use std::collections::HashMap;

use rundelta_core::{ElementEntry, ElementId, Generation};

/// Element store - the document body.
///
/// Entries live in a dense vector in order of first appearance; `index`
/// maps ids to positions. Overwriting an id keeps its position.
#[derive(Debug, Default, Clone)]
pub struct ElementStore {
    entries: Vec<ElementEntry>,
    index: HashMap<ElementId, usize>,
}

impl ElementStore {
    pub fn new() -> Self {
        ElementStore::default()
    }

    /// Get an entry by id
    pub fn get(&self, id: &ElementId) -> Option<&ElementEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Get a mutable entry by id
    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut ElementEntry> {
        match self.index.get(id) {
            Some(&pos) => self.entries.get_mut(pos),
            None => None,
        }
    }

    /// Insert or overwrite the entry at `entry.id`, returning the old one
    pub fn set(&mut self, entry: ElementEntry) -> Option<ElementEntry> {
        match self.index.get(&entry.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], entry)),
            None => {
                self.index.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    /// Remove an entry; later entries keep their relative order
    pub fn remove(&mut self, id: &ElementId) -> Option<ElementEntry> {
        let pos = self.index.remove(id)?;
        let entry = self.entries.remove(pos);
        for moved in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(&moved.id) {
                *slot -= 1;
            }
        }
        Some(entry)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in document order
    pub fn iter(&self) -> impl Iterator<Item = &ElementEntry> {
        self.entries.iter()
    }

    pub fn for_each_entry(&self, mut f: impl FnMut(&ElementEntry)) {
        for entry in &self.entries {
            f(entry);
        }
    }

    /// Ids last written by `generation`, in document order
    pub fn ids_in_generation<'a>(
        &'a self,
        generation: &'a Generation,
    ) -> impl Iterator<Item = &'a ElementId> + 'a {
        self.entries
            .iter()
            .filter(move |e| &e.generation == generation)
            .map(|e| &e.id)
    }

    /// Ids last written by any generation other than `generation`
    pub fn ids_outside_generation<'a>(
        &'a self,
        generation: &'a Generation,
    ) -> impl Iterator<Item = &'a ElementId> + 'a {
        self.entries
            .iter()
            .filter(move |e| &e.generation != generation)
            .map(|e| &e.id)
    }

    pub(crate) fn entries(&self) -> &[ElementEntry] {
        &self.entries
    }

    /// Calculate total memory usage
    pub fn memory_size(&self) -> usize {
        self.entries.iter().map(ElementEntry::memory_size).sum()
    }
}
