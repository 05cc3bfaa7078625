//! Identity types for rundelta
//!
//! Element ids and generations are assigned by the producing script run and
//! are opaque strings. Sweep tokens are assigned locally by the tracker.

use std::fmt;
use std::sync::Arc;

/// Stable element identity - unique within a session, never reused for a
/// semantically different slot
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(Arc<str>);

impl ElementId {
    #[inline]
    pub fn new(id: impl AsRef<str>) -> Self {
        ElementId(Arc::from(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        ElementId::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        ElementId(Arc::from(id))
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run identity - one script execution.
///
/// Generations are comparable only for equality. There is no ordering
/// between two generations beyond the order in which runs were announced,
/// which the tracker records itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Generation(Arc<str>);

impl Generation {
    #[inline]
    pub fn new(id: impl AsRef<str>) -> Self {
        Generation(Arc::from(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Generation {
    fn from(id: &str) -> Self {
        Generation::new(id)
    }
}

impl From<String> for Generation {
    fn from(id: String) -> Self {
        Generation(Arc::from(id))
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gen({})", self.0)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sweep timer token - stamps one scheduled sweep so a superseded timer
/// firing late can be recognized and ignored
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SweepToken(pub u64);

impl SweepToken {
    pub const ZERO: SweepToken = SweepToken(0);

    #[inline]
    pub fn new(token: u64) -> Self {
        SweepToken(token)
    }

    #[inline]
    pub fn next(self) -> Self {
        SweepToken(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for SweepToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sweep({})", self.0)
    }
}
