//! Generation tracker - which run is live, and when its predecessor's
//! leftovers get swept

use std::time::{Duration, Instant};

use rundelta_core::{Generation, SweepToken};

/// Tracker state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No run has started yet
    Idle,
    /// A run is live and nothing is waiting to be swept
    RunActive,
    /// A run is live and a sweep is scheduled
    SweepPending,
}

/// A scheduled sweep the host must arm a timer for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepTicket {
    pub token: SweepToken,
    pub deadline: Instant,
}

/// How a mutation's generation tag relates to the tracker
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagClass {
    /// Untagged, or tagged with the live run
    Current,
    /// Tagged with the run the live one superseded
    Previous { swept: bool },
    /// Tagged with a run the tracker does not know
    Unknown,
}

/// Generation tracker
///
/// INVARIANT: at most one sweep is pending; a newer run start replaces it
/// with a fresh token so the old timer's firing is a no-op.
#[derive(Debug)]
pub struct GenerationTracker {
    current: Option<Generation>,
    previous: Option<Generation>,
    pending: Option<SweepTicket>,
    last_token: SweepToken,
    run_finished: bool,
    sweep_delay: Duration,
}

impl GenerationTracker {
    pub fn new(sweep_delay: Duration) -> Self {
        GenerationTracker {
            current: None,
            previous: None,
            pending: None,
            last_token: SweepToken::ZERO,
            run_finished: false,
            sweep_delay,
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        match (&self.current, &self.pending) {
            (None, _) => TrackerPhase::Idle,
            (Some(_), Some(_)) => TrackerPhase::SweepPending,
            (Some(_), None) => TrackerPhase::RunActive,
        }
    }

    pub fn current(&self) -> Option<&Generation> {
        self.current.as_ref()
    }

    /// The run superseded by the current one
    pub fn previous(&self) -> Option<&Generation> {
        self.previous.as_ref()
    }

    pub fn pending(&self) -> Option<&SweepTicket> {
        self.pending.as_ref()
    }

    pub fn sweep_delay(&self) -> Duration {
        self.sweep_delay
    }

    /// Has the current run reported completion?
    pub fn run_finished(&self) -> bool {
        self.run_finished
    }

    /// Accept a new run. Always succeeds and replaces any pending sweep.
    pub fn on_run_started(&mut self, generation: Generation, now: Instant) -> SweepTicket {
        self.previous = self.current.replace(generation);
        self.run_finished = false;
        self.last_token = self.last_token.next();

        let ticket = SweepTicket {
            token: self.last_token,
            deadline: now + self.sweep_delay,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// Mark the current run complete. Returns whether a sweep should run
    /// now; false only when no run has ever started.
    pub fn on_run_finished(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        self.run_finished = true;
        self.pending = None;
        true
    }

    /// A sweep timer elapsed. Effective only if it is the pending one.
    pub fn on_sweep_timer_fired(&mut self, token: SweepToken) -> bool {
        match self.pending {
            Some(ticket) if ticket.token == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Token of the pending sweep if its deadline has passed
    pub fn sweep_due(&self, now: Instant) -> Option<SweepToken> {
        self.pending
            .filter(|ticket| now >= ticket.deadline)
            .map(|ticket| ticket.token)
    }

    /// Classify the generation a mutation claims to come from
    pub fn classify(&self, tag: Option<&Generation>) -> TagClass {
        let Some(tag) = tag else {
            return TagClass::Current;
        };
        if self.current.as_ref() == Some(tag) {
            TagClass::Current
        } else if self.previous.as_ref() == Some(tag) {
            TagClass::Previous {
                swept: self.pending.is_none(),
            }
        } else {
            TagClass::Unknown
        }
    }
}

impl Default for GenerationTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}
