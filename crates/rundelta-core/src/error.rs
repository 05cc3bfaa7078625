//! Error types for rundelta
//!
//! None of these are fatal to the engine. A document that returns one of
//! them is still consistent and keeps accepting events.

use thiserror::Error;

use crate::{ElementId, ElementKind, Generation};

/// Why an append could not be applied
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    /// No entry exists at the target id
    #[error("no entry to append to")]
    MissingEntry,
    /// The entry's kind does not accept rows
    #[error("kind {0:?} does not accept rows")]
    NotAppendable(ElementKind),
    /// The kind accepts rows but the payload is not tabular
    #[error("kind {0:?} holds a non-tabular payload")]
    PayloadNotTabular(ElementKind),
}

/// Reconciliation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Malformed mutation at {id}: {reason}")]
    MalformedMutation { id: ElementId, reason: MalformedReason },

    #[error("Unknown generation {generation} for {id} (current: {current})")]
    UnknownGeneration {
        id: ElementId,
        generation: Generation,
        current: Generation,
    },

    #[error("Stale generation {generation} for {id}: superseded by the live run")]
    StaleGeneration { id: ElementId, generation: Generation },

    #[error("Mutation for {id} before any run started")]
    NoActiveRun { id: ElementId },
}

impl ReconcileError {
    /// Target element of the dropped mutation
    pub fn element(&self) -> &ElementId {
        match self {
            ReconcileError::MalformedMutation { id, .. }
            | ReconcileError::UnknownGeneration { id, .. }
            | ReconcileError::StaleGeneration { id, .. }
            | ReconcileError::NoActiveRun { id } => id,
        }
    }
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
