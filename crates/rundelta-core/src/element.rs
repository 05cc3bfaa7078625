//! Element entry definitions
//!
//! An entry is the stored form of one renderable element. The engine
//! treats payloads as opaque, except for tabular payloads which expose an
//! append operation for row streaming.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::{ElementId, Generation};

/// Element kind classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementKind {
    /// Cleared slot, render nothing
    Empty = 0x00,

    // Tabular family (append-capable)
    Table = 0x01,
    Dataframe = 0x02,
    VegaLiteChart = 0x03,

    // Media
    ImageList = 0x10,

    // Text family
    Text = 0x20,
    Markdown = 0x21,
    DocString = 0x22,

    // Status
    Exception = 0x30,
    Progress = 0x31,
}

impl ElementKind {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(ElementKind::Empty),
            0x01 => Some(ElementKind::Table),
            0x02 => Some(ElementKind::Dataframe),
            0x03 => Some(ElementKind::VegaLiteChart),
            0x10 => Some(ElementKind::ImageList),
            0x20 => Some(ElementKind::Text),
            0x21 => Some(ElementKind::Markdown),
            0x22 => Some(ElementKind::DocString),
            0x30 => Some(ElementKind::Exception),
            0x31 => Some(ElementKind::Progress),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Can rows be appended to elements of this kind?
    pub fn supports_append(self) -> bool {
        matches!(
            self,
            ElementKind::Table | ElementKind::Dataframe | ElementKind::VegaLiteChart
        )
    }

    #[inline]
    pub fn is_placeholder(self) -> bool {
        self == ElementKind::Empty
    }
}

/// Tabular payload - a header plus ordered row sets.
///
/// `rows` is the primary data set. Charts may additionally carry named
/// datasets which are appended to independently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabularPayload {
    /// Opaque schema/spec bytes, never inspected
    pub header: Bytes,
    /// Primary rows in arrival order
    pub rows: Vec<Bytes>,
    /// Named datasets in arrival order per name
    pub datasets: BTreeMap<String, Vec<Bytes>>,
}

impl TabularPayload {
    pub fn new(header: impl Into<Bytes>) -> Self {
        TabularPayload {
            header: header.into(),
            ..TabularPayload::default()
        }
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Bytes>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn with_dataset(mut self, name: impl Into<String>, rows: Vec<Bytes>) -> Self {
        self.datasets.insert(name.into(), rows);
        self
    }

    /// Order-preserving concatenation onto the primary rows or a named
    /// dataset. An unknown dataset name starts a new dataset.
    pub fn append(&mut self, dataset: Option<&str>, rows: &[Bytes]) {
        let target = match dataset {
            None => &mut self.rows,
            Some(name) => self.datasets.entry(name.to_owned()).or_default(),
        };
        target.extend_from_slice(rows);
    }

    /// Rows of the primary set or a named dataset
    pub fn dataset(&self, name: Option<&str>) -> Option<&[Bytes]> {
        match name {
            None => Some(&self.rows),
            Some(name) => self.datasets.get(name).map(Vec::as_slice),
        }
    }

    /// Total row count over all sets
    pub fn row_count(&self) -> usize {
        self.rows.len() + self.datasets.values().map(Vec::len).sum::<usize>()
    }
}

/// Element payload
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Payload {
    /// No data (placeholder)
    #[default]
    None,
    /// Opaque kind-specific bytes
    Blob(Bytes),
    /// Appendable row data
    Tabular(TabularPayload),
}

impl Payload {
    pub fn blob(data: impl Into<Bytes>) -> Self {
        Payload::Blob(data.into())
    }

    pub fn as_tabular(&self) -> Option<&TabularPayload> {
        match self {
            Payload::Tabular(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tabular_mut(&mut self) -> Option<&mut TabularPayload> {
        match self {
            Payload::Tabular(t) => Some(t),
            _ => None,
        }
    }

    /// Estimated size in bytes
    pub fn memory_size(&self) -> usize {
        match self {
            Payload::None => 0,
            Payload::Blob(b) => b.len(),
            Payload::Tabular(t) => {
                t.header.len()
                    + t.rows.iter().map(Bytes::len).sum::<usize>()
                    + t.datasets
                        .iter()
                        .map(|(k, v)| k.len() + v.iter().map(Bytes::len).sum::<usize>())
                        .sum::<usize>()
            }
        }
    }
}

/// Element entry - one renderable element keyed by stable id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementEntry {
    pub id: ElementId,
    /// Run that last wrote this entry
    pub generation: Generation,
    pub kind: ElementKind,
    pub payload: Payload,
}

impl ElementEntry {
    pub fn new(id: ElementId, generation: Generation, kind: ElementKind, payload: Payload) -> Self {
        ElementEntry {
            id,
            generation,
            kind,
            payload,
        }
    }

    /// Cleared slot for `id`, owned by `generation`
    pub fn placeholder(id: ElementId, generation: Generation) -> Self {
        ElementEntry {
            id,
            generation,
            kind: ElementKind::Empty,
            payload: Payload::None,
        }
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.kind.is_placeholder()
    }

    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.id.as_str().len()
            + self.generation.as_str().len()
            + self.payload.memory_size()
    }
}
