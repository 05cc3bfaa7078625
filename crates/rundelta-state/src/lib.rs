//! rundelta State Engine - Delta-stream reconciliation
//!
//! This crate implements the Reconciliation Engine:
//! - Element store (ordered, id-keyed)
//! - Mutation application (replace / append)
//! - Generation tracking and sweep scheduling
//! - Staleness sweeps
//! - Point-in-time snapshots

pub mod store;
pub mod apply;
pub mod generation;
pub mod reconcile;
pub mod snapshot;
pub mod shared;

pub use store::*;
pub use apply::*;
pub use generation::*;
pub use reconcile::*;
pub use snapshot::*;
pub use shared::*;
