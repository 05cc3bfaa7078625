//! Point-in-time snapshots handed to renderers

use std::sync::Arc;

use rundelta_core::{ElementEntry, ElementId, Generation};

use crate::ElementStore;

/// Immutable copy of the document at one version.
///
/// Cloning is cheap; payload bytes are shared with the store.
#[derive(Clone, Debug)]
pub struct Snapshot {
    version: u64,
    generation: Option<Generation>,
    entries: Arc<[ElementEntry]>,
}

impl Snapshot {
    /// Snapshot of a document no event has touched
    pub fn empty() -> Self {
        Snapshot {
            version: 0,
            generation: None,
            entries: Arc::from(Vec::new()),
        }
    }

    pub(crate) fn capture(store: &ElementStore, generation: Option<&Generation>, version: u64) -> Self {
        Snapshot {
            version,
            generation: generation.cloned(),
            entries: Arc::from(store.entries()),
        }
    }

    /// Document version this snapshot was taken at
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Live run at capture time
    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    /// Entries in document order
    pub fn entries(&self) -> &[ElementEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementEntry> {
        self.entries.iter()
    }

    /// Entries that render something
    pub fn live(&self) -> impl Iterator<Item = &ElementEntry> {
        self.entries.iter().filter(|e| !e.is_placeholder())
    }

    /// Look up an entry by id. Linear scan; use `entries()` and build an
    /// index when doing many lookups on a large snapshot.
    pub fn get(&self, id: &ElementId) -> Option<&ElementEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Both snapshots share the same captured entries
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
