//! rundelta Core - Fundamental types for run-tagged element deltas
//!
//! This crate defines the types shared by the reconciliation engine and
//! its runtime:
//! - Identifiers (ElementId, Generation, SweepToken)
//! - Element entries, kinds and payloads
//! - Mutation records and inbound engine events
//! - Error taxonomy

pub mod id;
pub mod element;
pub mod event;
pub mod error;

pub use id::*;
pub use element::*;
pub use event::*;
pub use error::*;
