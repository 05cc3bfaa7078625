//! Mutation application
//!
//! `apply` is the pure form: it never touches the store and returns the
//! next entry for an id. `apply_in_place` has the same semantics but
//! appends rows without cloning the existing payload, and is what the
//! engine uses.

use rundelta_core::{
    AppendRecord, ElementEntry, ElementId, Generation, MalformedReason, MutationRecord,
};

use crate::ElementStore;

/// What a successful mutation did to the store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppliedMutation {
    /// Replace on an absent id
    Created,
    /// Replace on an existing id
    Replaced,
    /// Rows appended to an existing tabular entry
    Appended { rows: usize },
}

/// Check the append precondition against the current entry
pub fn check_append(current: Option<&ElementEntry>) -> Result<(), MalformedReason> {
    let entry = current.ok_or(MalformedReason::MissingEntry)?;
    if !entry.kind.supports_append() {
        return Err(MalformedReason::NotAppendable(entry.kind));
    }
    if entry.payload.as_tabular().is_none() {
        return Err(MalformedReason::PayloadNotTabular(entry.kind));
    }
    Ok(())
}

/// Produce the next entry for `id` from its current entry and a mutation
pub fn apply(
    current: Option<&ElementEntry>,
    id: &ElementId,
    record: &MutationRecord,
    generation: &Generation,
) -> Result<ElementEntry, MalformedReason> {
    match record {
        MutationRecord::Replace { kind, payload } => Ok(ElementEntry::new(
            id.clone(),
            generation.clone(),
            *kind,
            payload.clone(),
        )),
        MutationRecord::Append(append) => {
            check_append(current)?;
            let mut next = current.cloned().ok_or(MalformedReason::MissingEntry)?;
            append_rows(&mut next, append, generation);
            Ok(next)
        }
    }
}

/// Apply a mutation directly to the store.
///
/// On error the store is unchanged.
pub fn apply_in_place(
    store: &mut ElementStore,
    id: &ElementId,
    record: MutationRecord,
    generation: &Generation,
) -> Result<AppliedMutation, MalformedReason> {
    match record {
        MutationRecord::Replace { kind, payload } => {
            let entry = ElementEntry::new(id.clone(), generation.clone(), kind, payload);
            Ok(match store.set(entry) {
                Some(_) => AppliedMutation::Replaced,
                None => AppliedMutation::Created,
            })
        }
        MutationRecord::Append(append) => {
            check_append(store.get(id))?;
            let entry = store.get_mut(id).ok_or(MalformedReason::MissingEntry)?;
            append_rows(entry, &append, generation);
            Ok(AppliedMutation::Appended {
                rows: append.rows.len(),
            })
        }
    }
}

fn append_rows(entry: &mut ElementEntry, append: &AppendRecord, generation: &Generation) {
    if let Some(table) = entry.payload.as_tabular_mut() {
        table.append(append.dataset.as_deref(), &append.rows);
    }
    entry.generation = generation.clone();
}
