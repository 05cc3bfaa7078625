//! Event definitions
//!
//! Events are the only way a document changes. They arrive already decoded
//! from the transport, except `SweepTimerFired`, which the host pushes onto
//! the same serialized path when a scheduled sweep deadline elapses.

use bytes::Bytes;

use crate::{ElementId, ElementKind, Generation, Payload, SweepToken};

/// Rows to merge into an existing tabular payload
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppendRecord {
    /// Named dataset, `None` for the primary rows
    pub dataset: Option<String>,
    pub rows: Vec<Bytes>,
}

impl AppendRecord {
    pub fn new(rows: Vec<Bytes>) -> Self {
        AppendRecord {
            dataset: None,
            rows,
        }
    }

    pub fn to_dataset(name: impl Into<String>, rows: Vec<Bytes>) -> Self {
        AppendRecord {
            dataset: Some(name.into()),
            rows,
        }
    }
}

/// Mutation operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    /// Replace whatever is at the id with a new kind and payload
    Replace { kind: ElementKind, payload: Payload },
    /// Append rows to an existing tabular element
    Append(AppendRecord),
}

impl MutationRecord {
    pub fn replace(kind: ElementKind, payload: Payload) -> Self {
        MutationRecord::Replace { kind, payload }
    }

    pub fn append(rows: Vec<Bytes>) -> Self {
        MutationRecord::Append(AppendRecord::new(rows))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MutationRecord::Replace { .. } => "replace",
            MutationRecord::Append(_) => "append",
        }
    }
}

/// Inbound engine event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A new script run supersedes any in-progress one
    RunStarted { generation: Generation },
    /// One element mutation
    Mutation {
        id: ElementId,
        record: MutationRecord,
        /// Run the producer says emitted this mutation, if it says at all
        generation: Option<Generation>,
    },
    /// The current run completed
    RunFinished,
    /// A scheduled sweep deadline elapsed
    SweepTimerFired { token: SweepToken },
}

impl EngineEvent {
    pub fn run_started(generation: impl Into<Generation>) -> Self {
        EngineEvent::RunStarted {
            generation: generation.into(),
        }
    }

    pub fn mutation(id: impl Into<ElementId>, record: MutationRecord) -> Self {
        EngineEvent::Mutation {
            id: id.into(),
            record,
            generation: None,
        }
    }

    pub fn tagged_mutation(
        id: impl Into<ElementId>,
        record: MutationRecord,
        generation: impl Into<Generation>,
    ) -> Self {
        EngineEvent::Mutation {
            id: id.into(),
            record,
            generation: Some(generation.into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::RunStarted { .. } => "run_started",
            EngineEvent::Mutation { .. } => "mutation",
            EngineEvent::RunFinished => "run_finished",
            EngineEvent::SweepTimerFired { .. } => "sweep_timer_fired",
        }
    }
}
