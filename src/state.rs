//! NAR state: the single mutable container the whole engine lives in
//! (`spec.md` §3.8).

use crate::concept::ConceptMemory;
use crate::config::Config;
use crate::event::{Event, EventFlags, EventKind, Stamp, ETERNAL};
use crate::operation::{OperationCallback, OperationRegistry};
use crate::query::{self, Answer};
use crate::queue::EventQueue;
use crate::term::Term;
use crate::truth::Truth;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Everything the reasoner owns. Created by [`NarState::init`], wiped
/// back to a fresh-but-configured state by [`NarState::reset`], and
/// otherwise only touched by event submission, [`NarState::cycle`],
/// and queries — no other code path mutates it (`spec.md` §3.8
/// lifecycle).
pub struct NarState {
    pub(crate) memory: ConceptMemory,
    pub(crate) belief_queue: EventQueue,
    pub(crate) goal_queue: EventQueue,
    pub(crate) registry: OperationRegistry,
    /// Concept keys with a currently active prediction, so the cycle's
    /// anticipation check doesn't have to scan every concept
    /// (`spec.md` §3.8 "active anticipations list").
    pub(crate) anticipations: Vec<Term>,
    pub(crate) rng: StdRng,
    pub last_executed_operation: Option<Term>,
    pub config: Config,
}

/// Snapshot returned by [`NarState::stats`] (`spec.md` §6).
#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub current_time: i64,
    pub total_concepts: usize,
    pub belief_events_count: usize,
    pub goal_events_count: usize,
    pub average_concept_priority: f64,
}

impl NarState {
    pub fn init(config: Config) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        NarState {
            belief_queue: EventQueue::new(config.cycling_belief_events_max),
            goal_queue: EventQueue::new(config.cycling_goal_events_max),
            memory: ConceptMemory::new(),
            registry: OperationRegistry::new(),
            anticipations: Vec::new(),
            rng,
            last_executed_operation: None,
            config,
        }
    }

    /// Fresh state with the same configuration (`spec.md` §3.8 `reset`).
    pub fn reset(self) -> Self {
        NarState::init(self.config)
    }

    fn next_stamp_id(&mut self) -> u64 {
        let id = self.config.stamp_id;
        self.config.stamp_id += 1;
        id
    }

    pub fn register_operation(
        &mut self,
        name: Term,
        callback: OperationCallback,
    ) -> Result<u8, crate::error::OnaError> {
        self.registry.register(name, callback)
    }

    fn submit(&mut self, term: Term, truth: Truth, eternal: bool, kind: EventKind) {
        let stamp = Stamp::new(self.next_stamp_id());
        let occurrence_time = if eternal { ETERNAL } else { self.config.current_time };
        let event = Event::new(
            term,
            kind,
            truth,
            stamp,
            occurrence_time,
            self.config.current_time,
            EventFlags::INPUT,
        );
        let filed = self.memory.add_event(event.clone());
        match kind {
            EventKind::Belief => self.belief_queue.push(event, filed.priority),
            EventKind::Goal => self.goal_queue.push(event, filed.priority),
        }
        self.memory.enforce_capacity(self.config.concepts_max);
    }

    pub fn add_belief(&mut self, term: Term, truth: Truth, eternal: bool) {
        self.submit(term, truth, eternal, EventKind::Belief);
    }

    pub fn add_goal(&mut self, term: Term, truth: Truth, eternal: bool) {
        self.submit(term, truth, eternal, EventKind::Goal);
    }

    /// Run `n` inference cycles (`spec.md` §4.J).
    pub fn cycle(&mut self, n: usize) {
        for _ in 0..n {
            crate::cycle::step(self);
        }
    }

    /// Answer a query term without otherwise mutating concept content
    /// beyond question priming (`spec.md` §4.L, §8 round-trip
    /// property).
    pub fn ask(&mut self, term: &Term) -> Vec<Answer> {
        query::answer(self, term)
    }

    pub fn stats(&self) -> Stats {
        let total_concepts = self.memory.len();
        let average_concept_priority = if total_concepts == 0 {
            0.0
        } else {
            self.memory.iter().map(|(_, c)| c.priority).sum::<f64>() / total_concepts as f64
        };
        Stats {
            current_time: self.config.current_time,
            total_concepts,
            belief_events_count: self.belief_queue.len(),
            goal_events_count: self.goal_queue.len(),
            average_concept_priority,
        }
    }

    /// Canonical per-concept dump (priority, usefulness, use_count,
    /// last_used, active belief's `(f,c)`, implications with
    /// term/truth/offset) — the `*concepts` protocol directive
    /// (`spec.md` §6).
    pub fn dump_concepts(&self) -> String {
        let mut out = String::new();
        for (key, concept) in self.memory.iter() {
            out.push_str(&format!(
                "{key} priority={:.3} usefulness={:.3} use_count={} last_used={}",
                concept.priority, concept.usefulness, concept.use_count, concept.last_used
            ));
            if let Some(belief) = &concept.belief {
                out.push_str(&format!(" belief={}", belief.truth));
            }
            out.push('\n');
            for imp in concept.iterate_implications() {
                out.push_str(&format!(
                    "  {} {} offset={:.2}\n",
                    imp.term(),
                    imp.truth,
                    imp.occurrence_time_offset
                ));
            }
        }
        out
    }
}
