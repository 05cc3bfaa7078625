//! Session runtime - the single consumer of a document's events

use rundelta_core::EngineEvent;
use rundelta_state::{
    Document, EventOutcome, ReconciliationStats, Snapshot, SweepTicket,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::{RuntimeConfig, RuntimeError, RuntimeResult};

/// Final state of a session after shutdown
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub stats: ReconciliationStats,
    /// Events the document refused
    pub dropped: u64,
    pub snapshot: Snapshot,
}

/// Session - owns the document and processes events strictly in order.
///
/// Sweep timers are separate tasks, but they only ever push a
/// `SweepTimerFired` event into the session's own channel; they never touch
/// the document.
pub struct Session {
    document: Document,
    events: mpsc::Receiver<EngineEvent>,
    /// Weak so pending timers do not keep a closed session alive
    timer_events: mpsc::WeakSender<EngineEvent>,
    snapshots: watch::Sender<Snapshot>,
    sweep_timer: Option<JoinHandle<()>>,
    dropped: u64,
}

impl Session {
    /// Spawn a session task on the current tokio runtime
    pub fn spawn(config: &RuntimeConfig) -> SessionHandle {
        let (tx, rx) = mpsc::channel(config.event_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::empty());

        let session = Session {
            document: Document::with_config(config.engine_config()),
            events: rx,
            timer_events: tx.downgrade(),
            snapshots: snapshot_tx,
            sweep_timer: None,
            dropped: 0,
        };
        info!(sweep_delay_ms = config.sweep_delay_ms, "session starting");

        SessionHandle {
            events: tx,
            snapshots: snapshot_rx,
            task: tokio::spawn(session.run()),
        }
    }

    async fn run(mut self) -> SessionSummary {
        while let Some(event) = self.events.recv().await {
            self.process(event);
        }
        self.cancel_sweep_timer();

        let summary = SessionSummary {
            stats: self.document.stats().clone(),
            dropped: self.dropped,
            snapshot: self.document.read(),
        };
        info!(
            applied = summary.stats.applied,
            dropped = summary.dropped,
            sweeps = summary.stats.sweeps,
            "session closed"
        );
        summary
    }

    fn process(&mut self, event: EngineEvent) {
        let finished = matches!(event, EngineEvent::RunFinished);
        let before = self.document.version();

        match self.document.handle_event(event, Instant::now().into_std()) {
            Ok(EventOutcome::RunStarted(ticket)) => self.arm_sweep_timer(ticket),
            Ok(EventOutcome::Swept(_)) => self.cancel_sweep_timer(),
            Ok(_) => {}
            Err(_) => self.dropped += 1,
        }

        if finished || self.document.version() != before {
            self.snapshots.send_replace(self.document.read());
        }
    }

    /// Replace any armed timer with one for `ticket`
    fn arm_sweep_timer(&mut self, ticket: SweepTicket) {
        self.cancel_sweep_timer();

        let events = self.timer_events.clone();
        let deadline = Instant::from_std(ticket.deadline);
        debug!(token = ticket.token.0, "sweep timer armed");

        self.sweep_timer = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            if let Some(events) = events.upgrade() {
                let _ = events
                    .send(EngineEvent::SweepTimerFired {
                        token: ticket.token,
                    })
                    .await;
            }
        }));
    }

    fn cancel_sweep_timer(&mut self) {
        if let Some(timer) = self.sweep_timer.take() {
            timer.abort();
        }
    }
}

/// Handle to a running session
pub struct SessionHandle {
    events: mpsc::Sender<EngineEvent>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Queue an event; waits if the channel is full
    pub async fn send(&self, event: EngineEvent) -> RuntimeResult<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| RuntimeError::SessionClosed)
    }

    /// Sender for a transport task. The session stays open until every
    /// clone is dropped.
    pub fn sender(&self) -> mpsc::Sender<EngineEvent> {
        self.events.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Close the inbound channel and wait for the session to drain
    pub async fn shutdown(self) -> RuntimeResult<SessionSummary> {
        let SessionHandle { events, task, .. } = self;
        drop(events);
        task.await.map_err(|e| RuntimeError::SessionTask(e.to_string()))
    }
}
