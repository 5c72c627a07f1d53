//! Events: belief/goal judgments carried through the priority queues
//! (`spec.md` §3.3, §4.C).

use crate::term::Term;
use crate::truth::{self, Truth};
use bitflags::bitflags;
use std::collections::BTreeSet;

/// `now − spike.occurrence ≤ EVENT_BELIEF_DISTANCE` is the window
/// inside which a temporal belief spike overrides the eternal belief.
pub const EVENT_BELIEF_DISTANCE: i64 = 20;

/// Marks an event as eternal rather than tied to a logical tick.
pub const ETERNAL: i64 = -1;

bitflags! {
    /// Event flags (`spec.md` §3.3): `input?` marks events submitted
    /// directly rather than derived by the cycle; `executed?` marks an
    /// event reporting the outcome of an operation execution.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventFlags: u8 {
        const INPUT    = 0b0000_0001;
        const EXECUTED = 0b0000_0010;
    }
}

/// Whether an event carries a judgment about the world (`belief`) or
/// a desired state to pursue (`goal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Belief,
    Goal,
}

/// An evidential base. Revision of two truths is only valid when their
/// stamps are disjoint (`spec.md` §3.4 invariants, §9 open question 2);
/// this implementation unions stamp elements rather than keeping only
/// the first, per that open question's resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stamp(BTreeSet<u64>);

impl Stamp {
    pub fn new(id: u64) -> Self {
        Stamp(BTreeSet::from([id]))
    }

    pub fn overlaps(&self, other: &Stamp) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn union(&self, other: &Stamp) -> Stamp {
        Stamp(self.0.union(&other.0).copied().collect())
    }
}

/// A belief or goal judgment about a term, with its supporting
/// evidence and timing.
#[derive(Debug, Clone)]
pub struct Event {
    pub term: Term,
    pub kind: EventKind,
    pub truth: Truth,
    pub stamp: Stamp,
    /// Logical tick, or [`ETERNAL`].
    pub occurrence_time: i64,
    pub creation_time: i64,
    pub flags: EventFlags,
}

impl Event {
    pub fn new(
        term: Term,
        kind: EventKind,
        truth: Truth,
        stamp: Stamp,
        occurrence_time: i64,
        creation_time: i64,
        flags: EventFlags,
    ) -> Self {
        Event {
            term,
            kind,
            truth,
            stamp,
            occurrence_time,
            creation_time,
            flags,
        }
    }

    pub fn is_eternal(&self) -> bool {
        self.occurrence_time == ETERNAL
    }

    pub fn is_input(&self) -> bool {
        self.flags.contains(EventFlags::INPUT)
    }

    /// Priority of an event, `spec.md` §3.3: `E(truth) + (input? ? 0.1 : 0)`.
    pub fn priority(&self) -> f64 {
        truth::expectation(self.truth.frequency(), self.truth.confidence())
            + if self.is_input() { 0.1 } else { 0.0 }
    }

    /// Project this event to `target_time`, decaying confidence and
    /// leaving frequency unchanged; eternal events are returned as-is
    /// (`spec.md` §3.2, §4.C).
    pub fn project(&self, target_time: i64, beta: f64) -> Event {
        if self.is_eternal() {
            return self.clone();
        }
        let dt = (target_time - self.occurrence_time) as f64;
        Event {
            truth: self.truth.project(dt, beta),
            occurrence_time: target_time,
            ..self.clone()
        }
    }
}

/// Choose which belief to reason from: the temporal spike, projected
/// to `now`, if it's within [`EVENT_BELIEF_DISTANCE`]; otherwise the
/// eternal belief; otherwise whichever of the two is present.
/// (`spec.md` §4.C.)
pub fn select_belief<'a>(
    eternal: Option<&'a Event>,
    spike: Option<&'a Event>,
    now: i64,
    beta: f64,
) -> Option<Event> {
    match (eternal, spike) {
        (Some(eternal), Some(spike)) => {
            if now - spike.occurrence_time <= EVENT_BELIEF_DISTANCE {
                Some(spike.project(now, beta))
            } else {
                Some(eternal.clone())
            }
        }
        (Some(eternal), None) => Some(eternal.clone()),
        (None, Some(spike)) => Some(spike.clone()),
        (None, None) => None,
    }
}
