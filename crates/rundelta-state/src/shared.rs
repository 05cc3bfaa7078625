//! Thread-safe document handle

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rundelta_core::{EngineEvent, ReconcileResult};

use crate::{Document, EngineConfig, EventOutcome, ReconciliationStats, Snapshot, SweepReport};

/// Document behind a mutex, for hosts that feed events from more than one
/// thread. Every event and every snapshot read takes the lock, so a reader
/// never observes a half-applied mutation or sweep.
#[derive(Clone, Debug)]
pub struct SharedDocument {
    inner: Arc<Mutex<Document>>,
}

impl SharedDocument {
    pub fn new(config: EngineConfig) -> Self {
        SharedDocument {
            inner: Arc::new(Mutex::new(Document::with_config(config))),
        }
    }

    pub fn handle_event(&self, event: EngineEvent, now: Instant) -> ReconcileResult<EventOutcome> {
        self.inner.lock().handle_event(event, now)
    }

    pub fn poll_sweep(&self, now: Instant) -> Option<SweepReport> {
        self.inner.lock().poll_sweep(now)
    }

    pub fn read(&self) -> Snapshot {
        self.inner.lock().read()
    }

    pub fn stats(&self) -> ReconciliationStats {
        self.inner.lock().stats().clone()
    }

    /// Run `f` with exclusive access to the document
    pub fn with<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl Default for SharedDocument {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
