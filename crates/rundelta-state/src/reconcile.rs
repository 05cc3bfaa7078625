//! Reconciliation pipeline

use std::time::{Duration, Instant};

use rundelta_core::{
    ElementEntry, ElementId, EngineEvent, Generation, MutationRecord, ReconcileError,
    ReconcileResult, SweepToken,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    apply_in_place, AppliedMutation, ElementStore, GenerationTracker, Snapshot, SweepTicket,
    TagClass,
};

/// What to do with entries left behind by a superseded run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SweepPolicy {
    /// Overwrite with an empty placeholder, keeping the slot
    #[default]
    Placeholder,
    /// Delete the id
    Remove,
}

/// Handling for mutations tagged with a run the tracker does not know
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownGenerationPolicy {
    /// Apply as if it came from the current run
    #[default]
    Adopt,
    /// Drop it
    Reject,
}

/// Engine configuration
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Grace window between a run start and the sweep of older entries
    pub sweep_delay: Duration,
    pub sweep_policy: SweepPolicy,
    pub unknown_generation: UnknownGenerationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sweep_delay: Duration::from_millis(3000),
            sweep_policy: SweepPolicy::Placeholder,
            unknown_generation: UnknownGenerationPolicy::Adopt,
        }
    }
}

impl EngineConfig {
    /// Sweep as soon as the host polls after a run start
    pub fn immediate() -> Self {
        EngineConfig {
            sweep_delay: Duration::ZERO,
            ..EngineConfig::default()
        }
    }

    /// Strict producer checking
    pub fn strict() -> Self {
        EngineConfig {
            unknown_generation: UnknownGenerationPolicy::Reject,
            ..EngineConfig::default()
        }
    }
}

/// Result of one sweep
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepReport {
    /// Generation the survivors belong to
    pub generation: Generation,
    /// Entries overwritten with placeholders
    pub cleared: usize,
    /// Entries deleted
    pub removed: usize,
}

impl SweepReport {
    pub fn touched(&self) -> usize {
        self.cleared + self.removed
    }
}

/// Result of one processed event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// A new run is live; the host should arm a timer for the ticket
    RunStarted(SweepTicket),
    /// A mutation was written
    Applied {
        id: ElementId,
        mutation: AppliedMutation,
    },
    /// Stale entries were cleared
    Swept(SweepReport),
    /// Nothing changed (stale timer, finish before any run)
    Ignored,
}

/// Counters over the life of a document
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconciliationStats {
    pub runs_started: u64,
    pub runs_finished: u64,
    pub applied: u64,
    pub appended_rows: u64,
    pub rejected: u64,
    pub adopted: u64,
    pub sweeps: u64,
    pub swept_entries: u64,
    pub stale_timers: u64,
}

/// Document - one session's element store and generation state.
///
/// All changes go through `handle_event`, one at a time. The caller is
/// responsible for serializing calls; `SharedDocument` does that for
/// multi-threaded hosts.
#[derive(Debug)]
pub struct Document {
    store: ElementStore,
    tracker: GenerationTracker,
    config: EngineConfig,
    stats: ReconciliationStats,
    version: u64,
    /// Snapshot of `version`, built on first read
    cached: Mutex<Option<Snapshot>>,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Document {
            store: ElementStore::new(),
            tracker: GenerationTracker::new(config.sweep_delay),
            config,
            stats: ReconciliationStats::default(),
            version: 0,
            cached: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn tracker(&self) -> &GenerationTracker {
        &self.tracker
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &ReconciliationStats {
        &self.stats
    }

    /// Bumped on every change visible in a snapshot
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn current_generation(&self) -> Option<&Generation> {
        self.tracker.current()
    }

    /// Take a snapshot of the document as of the last processed event.
    ///
    /// Reads at the same version share one snapshot.
    pub fn read(&self) -> Snapshot {
        self.cached
            .lock()
            .get_or_insert_with(|| Snapshot::capture(&self.store, self.tracker.current(), self.version))
            .clone()
    }

    fn bump_version(&mut self) {
        self.version += 1;
        *self.cached.get_mut() = None;
    }

    /// Process a single event.
    ///
    /// Errors are recoverable: the offending mutation was dropped and the
    /// document is unchanged by it.
    pub fn handle_event(&mut self, event: EngineEvent, now: Instant) -> ReconcileResult<EventOutcome> {
        match event {
            EngineEvent::RunStarted { generation } => Ok(self.start_run(generation, now)),
            EngineEvent::Mutation {
                id,
                record,
                generation,
            } => self.apply_mutation(id, record, generation),
            EngineEvent::RunFinished => Ok(self.finish_run()),
            EngineEvent::SweepTimerFired { token } => Ok(self.fire_sweep_timer(token)),
        }
    }

    /// Fire the pending sweep if its deadline has passed.
    ///
    /// For hosts that drive the document from a tick loop instead of
    /// timer tasks.
    pub fn poll_sweep(&mut self, now: Instant) -> Option<SweepReport> {
        let token = self.tracker.sweep_due(now)?;
        match self.fire_sweep_timer(token) {
            EventOutcome::Swept(report) => Some(report),
            _ => None,
        }
    }

    fn start_run(&mut self, generation: Generation, now: Instant) -> EventOutcome {
        let ticket = self.tracker.on_run_started(generation, now);
        self.stats.runs_started += 1;
        self.bump_version();

        info!(
            generation = %display_generation(self.tracker.current()),
            previous = %display_generation(self.tracker.previous()),
            token = ticket.token.0,
            "run started"
        );
        EventOutcome::RunStarted(ticket)
    }

    fn finish_run(&mut self) -> EventOutcome {
        if !self.tracker.on_run_finished() {
            debug!("run finished before any run started");
            return EventOutcome::Ignored;
        }
        self.stats.runs_finished += 1;
        info!(generation = %display_generation(self.tracker.current()), "run finished");
        self.sweep()
    }

    fn fire_sweep_timer(&mut self, token: SweepToken) -> EventOutcome {
        if !self.tracker.on_sweep_timer_fired(token) {
            self.stats.stale_timers += 1;
            debug!(token = token.0, "superseded sweep timer ignored");
            return EventOutcome::Ignored;
        }
        self.sweep()
    }

    fn apply_mutation(
        &mut self,
        id: ElementId,
        record: MutationRecord,
        tag: Option<Generation>,
    ) -> ReconcileResult<EventOutcome> {
        let generation = match self.resolve_generation(&id, tag) {
            Ok(generation) => generation,
            Err(err) => {
                self.stats.rejected += 1;
                warn!(%err, "mutation dropped");
                return Err(err);
            }
        };

        let kind = record.name();
        match apply_in_place(&mut self.store, &id, record, &generation) {
            Ok(mutation) => {
                self.stats.applied += 1;
                if let AppliedMutation::Appended { rows } = mutation {
                    self.stats.appended_rows += rows as u64;
                }
                self.bump_version();
                debug!(id = %id, generation = %generation, kind, ?mutation, "mutation applied");
                Ok(EventOutcome::Applied { id, mutation })
            }
            Err(reason) => {
                self.stats.rejected += 1;
                let err = ReconcileError::MalformedMutation { id, reason };
                warn!(%err, kind, "mutation dropped");
                Err(err)
            }
        }
    }

    /// Pick the generation a mutation is written with
    fn resolve_generation(&mut self, id: &ElementId, tag: Option<Generation>) -> ReconcileResult<Generation> {
        let Some(current) = self.tracker.current().cloned() else {
            return Err(ReconcileError::NoActiveRun { id: id.clone() });
        };

        match self.tracker.classify(tag.as_ref()) {
            TagClass::Current => Ok(current),
            // Late output of the superseded run: keep its tag so the
            // pending sweep reclaims it. Never touches an entry the live
            // run already wrote.
            TagClass::Previous { swept: false } => {
                let generation = tag.unwrap_or_else(|| current.clone());
                match self.store.get(id) {
                    Some(entry) if entry.generation == current => Err(ReconcileError::StaleGeneration {
                        id: id.clone(),
                        generation,
                    }),
                    _ => Ok(generation),
                }
            }
            TagClass::Previous { swept: true } => Err(ReconcileError::StaleGeneration {
                id: id.clone(),
                generation: tag.unwrap_or(current),
            }),
            TagClass::Unknown => {
                let generation = tag.unwrap_or_else(|| current.clone());
                match self.config.unknown_generation {
                    UnknownGenerationPolicy::Adopt => {
                        self.stats.adopted += 1;
                        warn!(id = %id, %generation, current = %current, "unknown generation adopted as current");
                        Ok(current)
                    }
                    UnknownGenerationPolicy::Reject => Err(ReconcileError::UnknownGeneration {
                        id: id.clone(),
                        generation,
                        current,
                    }),
                }
            }
        }
    }

    /// Clear every entry not written by the current run
    fn sweep(&mut self) -> EventOutcome {
        let Some(current) = self.tracker.current().cloned() else {
            return EventOutcome::Ignored;
        };

        let stale: Vec<ElementId> = self.store.ids_outside_generation(&current).cloned().collect();
        let mut report = SweepReport {
            generation: current.clone(),
            cleared: 0,
            removed: 0,
        };

        for id in stale {
            match self.config.sweep_policy {
                SweepPolicy::Placeholder => {
                    self.store.set(ElementEntry::placeholder(id, current.clone()));
                    report.cleared += 1;
                }
                SweepPolicy::Remove => {
                    if self.store.remove(&id).is_some() {
                        report.removed += 1;
                    }
                }
            }
        }

        self.stats.sweeps += 1;
        self.stats.swept_entries += report.touched() as u64;
        if report.touched() > 0 {
            self.bump_version();
        }

        info!(
            generation = %current,
            cleared = report.cleared,
            removed = report.removed,
            "sweep complete"
        );
        EventOutcome::Swept(report)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn display_generation(generation: Option<&Generation>) -> &str {
    generation.map(Generation::as_str).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use rundelta_core::{ElementKind, MalformedReason, Payload, TabularPayload};

    fn text(payload: &'static str) -> MutationRecord {
        MutationRecord::replace(ElementKind::Text, Payload::blob(payload))
    }

    fn rows(names: &[&'static str]) -> Vec<Bytes> {
        names.iter().map(|n| Bytes::from_static(n.as_bytes())).collect()
    }

    fn feed(doc: &mut Document, events: Vec<EngineEvent>, now: Instant) {
        for event in events {
            let _ = doc.handle_event(event, now);
        }
    }

    fn generation_of(doc: &Document, id: &str) -> Option<String> {
        doc.store()
            .get(&ElementId::new(id))
            .map(|e| e.generation.to_string())
    }

    #[test]
    fn test_reconciliation_basic() {
        let mut doc = Document::new();
        let now = Instant::now();

        doc.handle_event(EngineEvent::run_started("g1"), now).unwrap();
        let outcome = doc.handle_event(EngineEvent::mutation("a", text("hi")), now).unwrap();

        assert_eq!(
            outcome,
            EventOutcome::Applied {
                id: ElementId::new("a"),
                mutation: AppliedMutation::Created,
            }
        );
        assert_eq!(doc.stats().applied, 1);
        assert!(doc.store().contains(&ElementId::new("a")));
    }

    #[test]
    fn test_monotonic_generation() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![EngineEvent::run_started("g1"), EngineEvent::run_started("g2")],
            now,
        );
        assert_eq!(doc.current_generation(), Some(&Generation::new("g2")));
    }

    #[test]
    fn test_sweep_precision() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("1"),
                EngineEvent::mutation("A", text("a")),
                EngineEvent::run_started("2"),
                EngineEvent::mutation("B", text("b")),
            ],
            now,
        );

        let outcome = doc.handle_event(EngineEvent::RunFinished, now).unwrap();
        assert!(matches!(outcome, EventOutcome::Swept(ref r) if r.cleared == 1));

        let a = doc.store().get(&ElementId::new("A")).unwrap();
        assert_eq!(a.kind, ElementKind::Empty);
        assert_eq!(a.generation, Generation::new("2"));

        let b = doc.store().get(&ElementId::new("B")).unwrap();
        assert_eq!(b.kind, ElementKind::Text);
        assert_eq!(b.payload, Payload::blob("b"));
    }

    #[test]
    fn test_append_without_entry_is_malformed() {
        let mut doc = Document::new();
        let now = Instant::now();
        doc.handle_event(EngineEvent::run_started("g1"), now).unwrap();
        let version = doc.version();

        let err = doc
            .handle_event(EngineEvent::mutation("x", MutationRecord::append(rows(&["r"]))), now)
            .unwrap_err();

        assert_eq!(
            err,
            ReconcileError::MalformedMutation {
                id: ElementId::new("x"),
                reason: MalformedReason::MissingEntry,
            }
        );
        assert!(doc.store().is_empty());
        assert_eq!(doc.version(), version);
        assert_eq!(doc.stats().rejected, 1);
    }

    #[test]
    fn test_stream_continues_after_malformed() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::mutation("t", text("not a table")),
                EngineEvent::mutation("t", MutationRecord::append(rows(&["r"]))),
                EngineEvent::mutation("u", text("after")),
            ],
            now,
        );
        assert_eq!(doc.store().len(), 2);
        assert_eq!(doc.stats().rejected, 1);
    }

    #[test]
    fn test_replace_overwrites() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::mutation("x", text("P1")),
                EngineEvent::run_started("g2"),
                EngineEvent::mutation("x", text("P2")),
            ],
            now,
        );

        let x = doc.store().get(&ElementId::new("x")).unwrap();
        assert_eq!(x.payload, Payload::blob("P2"));
        assert_eq!(x.generation, Generation::new("g2"));
    }

    #[test]
    fn test_append_accumulation() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::mutation(
                    "t",
                    MutationRecord::replace(
                        ElementKind::Table,
                        Payload::Tabular(TabularPayload::new("cols").with_rows(rows(&["r1"]))),
                    ),
                ),
                EngineEvent::mutation("t", MutationRecord::append(rows(&["r2", "r3"]))),
            ],
            now,
        );

        let t = doc.store().get(&ElementId::new("t")).unwrap();
        assert_eq!(t.payload.as_tabular().map(|p| p.rows.clone()), Some(rows(&["r1", "r2", "r3"])));
        assert_eq!(doc.stats().appended_rows, 2);
    }

    #[test]
    fn test_timer_cancellation() {
        let mut doc = Document::new();
        let now = Instant::now();

        let EventOutcome::RunStarted(first) = doc.handle_event(EngineEvent::run_started("g1"), now).unwrap() else {
            panic!("expected run start");
        };
        doc.handle_event(EngineEvent::mutation("old", text("o")), now).unwrap();
        let EventOutcome::RunStarted(second) = doc.handle_event(EngineEvent::run_started("g2"), now).unwrap() else {
            panic!("expected run start");
        };
        doc.handle_event(EngineEvent::mutation("new", text("n")), now).unwrap();

        let stale = doc
            .handle_event(EngineEvent::SweepTimerFired { token: first.token }, now)
            .unwrap();
        assert_eq!(stale, EventOutcome::Ignored);
        assert_eq!(generation_of(&doc, "old").as_deref(), Some("g1"));

        let fired = doc
            .handle_event(EngineEvent::SweepTimerFired { token: second.token }, now)
            .unwrap();
        assert!(matches!(fired, EventOutcome::Swept(_)));
        assert_eq!(doc.stats().sweeps, 1);
        assert_eq!(doc.stats().stale_timers, 1);
        assert_eq!(generation_of(&doc, "old").as_deref(), Some("g2"));
    }

    #[test]
    fn test_unfinished_run_entries_survive_until_sweep() {
        let mut doc = Document::new();
        let start = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::mutation("a", text("a1")),
                EngineEvent::mutation("b", text("b1")),
                EngineEvent::run_started("g2"),
                EngineEvent::mutation("a", text("a2")),
            ],
            start,
        );

        // inside the grace window the old run's output is still shown
        assert_eq!(doc.poll_sweep(start + Duration::from_millis(2999)), None);
        assert_eq!(doc.read().live().count(), 2);

        let report = doc.poll_sweep(start + Duration::from_millis(3000)).unwrap();
        assert_eq!(report.cleared, 1);
        let live: Vec<_> = doc.read().live().map(|e| e.id.to_string()).collect();
        assert_eq!(live, vec!["a"]);
        assert_eq!(doc.poll_sweep(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_remove_policy_deletes_stale_ids() {
        let config = EngineConfig {
            sweep_policy: SweepPolicy::Remove,
            ..EngineConfig::default()
        };
        let mut doc = Document::with_config(config);
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::mutation("a", text("a")),
                EngineEvent::mutation("b", text("b")),
                EngineEvent::mutation("c", text("c")),
                EngineEvent::run_started("g2"),
                EngineEvent::mutation("c", text("c2")),
                EngineEvent::mutation("a", text("a2")),
                EngineEvent::RunFinished,
            ],
            now,
        );

        let ids: Vec<_> = doc.read().iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_mutation_before_any_run() {
        let mut doc = Document::new();
        let err = doc
            .handle_event(EngineEvent::mutation("a", text("a")), Instant::now())
            .unwrap_err();
        assert_eq!(err, ReconcileError::NoActiveRun { id: ElementId::new("a") });
        assert_eq!(
            doc.handle_event(EngineEvent::RunFinished, Instant::now()).unwrap(),
            EventOutcome::Ignored
        );
    }

    #[test]
    fn test_previous_generation_tag_before_and_after_sweep() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![EngineEvent::run_started("g1"), EngineEvent::run_started("g2")],
            now,
        );

        doc.handle_event(EngineEvent::tagged_mutation("late", text("l"), "g1"), now)
            .unwrap();
        assert_eq!(generation_of(&doc, "late").as_deref(), Some("g1"));

        doc.handle_event(EngineEvent::RunFinished, now).unwrap();
        assert!(doc.store().get(&ElementId::new("late")).unwrap().is_placeholder());

        let err = doc
            .handle_event(EngineEvent::tagged_mutation("later", text("l"), "g1"), now)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::StaleGeneration { .. }));
        assert!(!doc.store().contains(&ElementId::new("later")));
    }

    #[test]
    fn test_late_replace_cannot_overwrite_live_entry() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::run_started("g2"),
                EngineEvent::mutation("a", text("new")),
            ],
            now,
        );

        let err = doc
            .handle_event(EngineEvent::tagged_mutation("a", text("old"), "g1"), now)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::StaleGeneration { .. }));

        let a = doc.store().get(&ElementId::new("a")).unwrap();
        assert_eq!(a.payload, Payload::blob("new"));
        assert_eq!(a.generation, Generation::new("g2"));

        doc.handle_event(EngineEvent::RunFinished, now).unwrap();
        let a = doc.store().get(&ElementId::new("a")).unwrap();
        assert_eq!(a.kind, ElementKind::Text);
        assert_eq!(a.payload, Payload::blob("new"));
    }

    #[test]
    fn test_late_append_cannot_retag_live_table() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::run_started("g2"),
                EngineEvent::mutation(
                    "t",
                    MutationRecord::replace(
                        ElementKind::Table,
                        Payload::Tabular(TabularPayload::new("cols").with_rows(rows(&["r1"]))),
                    ),
                ),
            ],
            now,
        );

        let err = doc
            .handle_event(
                EngineEvent::tagged_mutation("t", MutationRecord::append(rows(&["late"])), "g1"),
                now,
            )
            .unwrap_err();
        assert!(matches!(err, ReconcileError::StaleGeneration { .. }));
        assert_eq!(generation_of(&doc, "t").as_deref(), Some("g2"));

        doc.handle_event(EngineEvent::RunFinished, now).unwrap();
        let t = doc.store().get(&ElementId::new("t")).unwrap();
        assert_eq!(t.kind, ElementKind::Table);
        assert_eq!(t.payload.as_tabular().map(|p| p.rows.clone()), Some(rows(&["r1"])));
    }

    #[test]
    fn test_late_append_to_own_table_is_kept_until_sweep() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![
                EngineEvent::run_started("g1"),
                EngineEvent::mutation(
                    "t",
                    MutationRecord::replace(ElementKind::Table, Payload::Tabular(TabularPayload::new("cols"))),
                ),
                EngineEvent::run_started("g2"),
            ],
            now,
        );

        doc.handle_event(
            EngineEvent::tagged_mutation("t", MutationRecord::append(rows(&["r1"])), "g1"),
            now,
        )
        .unwrap();
        assert_eq!(generation_of(&doc, "t").as_deref(), Some("g1"));
    }

    #[test]
    fn test_unknown_generation_policies() {
        let now = Instant::now();

        let mut adopt = Document::new();
        adopt.handle_event(EngineEvent::run_started("g1"), now).unwrap();
        adopt
            .handle_event(EngineEvent::tagged_mutation("a", text("a"), "zz"), now)
            .unwrap();
        assert_eq!(generation_of(&adopt, "a").as_deref(), Some("g1"));
        assert_eq!(adopt.stats().adopted, 1);

        let mut strict = Document::with_config(EngineConfig::strict());
        strict.handle_event(EngineEvent::run_started("g1"), now).unwrap();
        let err = strict
            .handle_event(EngineEvent::tagged_mutation("a", text("a"), "zz"), now)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownGeneration { .. }));
        assert!(strict.store().is_empty());
    }

    #[test]
    fn test_snapshot_versions_track_changes() {
        let mut doc = Document::new();
        let now = Instant::now();
        let v0 = doc.read();

        doc.handle_event(EngineEvent::run_started("g1"), now).unwrap();
        doc.handle_event(EngineEvent::mutation("a", text("a")), now).unwrap();
        let v1 = doc.read();

        assert!(v1.version() > v0.version());
        assert_eq!(v1.generation(), Some(&Generation::new("g1")));
        assert!(v0.is_empty());
        assert_eq!(v1.len(), 1);
    }

    #[test]
    fn test_reads_share_snapshot_until_next_change() {
        let mut doc = Document::new();
        let now = Instant::now();
        feed(
            &mut doc,
            vec![EngineEvent::run_started("g1"), EngineEvent::mutation("a", text("a"))],
            now,
        );

        let first = doc.read();
        let second = doc.read();
        assert!(first.ptr_eq(&second));

        // dropped mutations and stale timers leave the version alone
        let _ = doc.handle_event(EngineEvent::mutation("x", MutationRecord::append(rows(&["r"]))), now);
        let _ = doc.handle_event(EngineEvent::SweepTimerFired { token: SweepToken::new(99) }, now);
        assert!(doc.read().ptr_eq(&first));

        doc.handle_event(EngineEvent::mutation("b", text("b")), now).unwrap();
        let third = doc.read();
        assert!(!third.ptr_eq(&first));
        assert_eq!(third.len(), 2);
        assert_eq!(first.len(), 1);
    }
}
