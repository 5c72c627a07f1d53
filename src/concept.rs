//! Concept memory: the per-term memory cell and the map that owns all
//! of them, indexed by the inverted atom index (`spec.md` §3.5, §4.G).

use crate::event::{Event, EventKind};
use crate::implication::Implication;
use crate::index::InvertedAtomIndex;
use crate::operation::OperationRegistry;
use crate::prediction::Prediction;
use crate::term::{Copula, Term};
use hashbrown::HashSet;
use indexmap::IndexMap;

/// Number of operation-indexed implication tables per concept: index 0
/// for declarative implications, 1..10 for procedural ones keyed by
/// operation ID (`spec.md` §3.5).
pub const IMPLICATION_TABLES: usize = 11;

/// Recommended cap on entries per operation-indexed table (`spec.md`
/// §5 resource bounds). A table at capacity evicts its oldest entry
/// before a new precondition is filed — the same first-in-first-out
/// policy the event queues use on overflow. Revising an existing
/// entry never triggers eviction: it overwrites the value at its
/// current table position without adding a new one.
pub const TABLE_CAP: usize = 120;

/// The concept key for `term`: the subject, for an inheritance
/// compound; the term itself otherwise (`spec.md` §3.5, §8).
pub fn concept_key(term: &Term) -> Term {
    match term {
        Term::Compound(c) if c.copula() == Copula::Inheritance => c.left().clone(),
        _ => term.clone(),
    }
}

/// The operation-indexed table a `<A =/> B>` implication belongs in:
/// the registered ID of `A`'s rightmost leaf, or 0 if that leaf isn't a
/// registered operation (`spec.md` §3.5, §8 testable properties).
pub fn operation_index(precondition: &Term, registry: &OperationRegistry) -> u8 {
    registry.index_of(precondition.rightmost_leaf())
}

/// A memory cell keyed by [`concept_key`].
#[derive(Debug)]
pub struct Concept {
    pub key: Term,
    pub priority: f64,
    pub usefulness: f64,
    pub use_count: u64,
    pub last_used: i64,
    pub belief: Option<Event>,
    pub belief_spike: Option<Event>,
    pub predicted_belief: Option<Event>,
    pub active_prediction: Option<Prediction>,
    precondition_beliefs: [IndexMap<Term, Implication>; IMPLICATION_TABLES],
    pub implication_links: IndexMap<Term, Implication>,
    indexed_terms: HashSet<Term>,
}

impl Concept {
    fn new(key: Term) -> Self {
        Concept {
            key,
            priority: 0.5,
            usefulness: 0.5,
            use_count: 0,
            last_used: 0,
            belief: None,
            belief_spike: None,
            predicted_belief: None,
            active_prediction: None,
            precondition_beliefs: Default::default(),
            implication_links: IndexMap::new(),
            indexed_terms: HashSet::new(),
        }
    }

    pub fn table(&self, index: u8) -> &IndexMap<Term, Implication> {
        &self.precondition_beliefs[index as usize]
    }

    pub(crate) fn table_mut(&mut self, index: u8) -> &mut IndexMap<Term, Implication> {
        &mut self.precondition_beliefs[index as usize]
    }

    /// Walk all 11 tables in order (declarative forward chaining and
    /// queries; `spec.md` §4.G).
    pub fn iterate_implications(&self) -> impl Iterator<Item = &Implication> {
        self.precondition_beliefs.iter().flat_map(|t| t.values())
    }

    /// Walk only the procedural tables 1..10 (decision making;
    /// `spec.md` §4.G, §4.K).
    pub fn iterate_procedural(&self) -> impl Iterator<Item = &Implication> {
        self.precondition_beliefs[1..].iter().flat_map(|t| t.values())
    }

    /// Reward this concept's usefulness for having produced a real
    /// payoff — a confirmed prediction or a successfully executed
    /// operation reached through it. Mirrors the teacher's budget-style
    /// bookkeeping (`examples/automenta-narchyrust/src/control/
    /// budget.rs`) but scoped to the one quality signal `spec.md` §3.5
    /// names without a formula: usefulness should track whether a
    /// concept's stored knowledge actually pays off, not just how often
    /// it's touched (that's `use_count`'s job).
    pub fn bump_usefulness(&mut self) {
        self.usefulness = (self.usefulness + USEFULNESS_BUMP).clamp(0.0, 1.0);
    }
}

/// Usefulness reward per payoff event (`Concept::bump_usefulness`),
/// sized the same as the priority bump `ConceptMemory::add_event` gives
/// on every touch so that a concept needs several real payoffs, not
/// just traffic, to climb noticeably above the `0.5` baseline.
const USEFULNESS_BUMP: f64 = 0.1;

/// The concept table plus the inverted atom index that caches it.
#[derive(Debug, Default)]
pub struct ConceptMemory {
    concepts: IndexMap<Term, Concept>,
    index: InvertedAtomIndex,
}

/// What happened when an event was filed into memory: which concept it
/// landed on and the priority it should be enqueued with. Enqueuing
/// itself is the caller's job — this module doesn't own the priority
/// queues.
pub struct FiledEvent {
    pub concept_key: Term,
    pub priority: f64,
}

impl ConceptMemory {
    pub fn new() -> Self {
        ConceptMemory::default()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn get(&self, key: &Term) -> Option<&Concept> {
        self.concepts.get(key)
    }

    pub fn get_mut(&mut self, key: &Term) -> Option<&mut Concept> {
        self.concepts.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Concept)> {
        self.concepts.iter()
    }

    pub fn index(&self) -> &InvertedAtomIndex {
        &self.index
    }

    /// Return the concept for `key`, creating it with empty tables and
    /// priority 0.5 if absent (`spec.md` §4.G).
    pub fn get_or_create(&mut self, key: Term) -> &mut Concept {
        self.concepts.entry(key.clone()).or_insert_with(|| Concept::new(key))
    }

    /// File a belief or goal event (`spec.md` §4.G `add_event`): create
    /// the concept if missing, index it, update `belief`/`belief_spike`
    /// for belief events, and bump priority/use stats.
    pub fn add_event(&mut self, event: Event) -> FiledEvent {
        let key = concept_key(&event.term);
        let priority = event.priority();
        let creation_time = event.creation_time;
        let term = event.term.clone();

        self.index.add(&key, &term);
        let concept = self.get_or_create(key.clone());
        concept.indexed_terms.insert(term);

        if event.kind == EventKind::Belief {
            if event.is_eternal() {
                concept.belief = Some(match concept.belief.take() {
                    Some(existing) if !existing.stamp.overlaps(&event.stamp) => {
                        revise_belief_events(&existing, &event)
                    }
                    _ => event.clone(),
                });
            } else {
                concept.belief_spike = Some(event.clone());
            }
        }

        concept.priority = (concept.priority + 0.1).clamp(0.0, 1.0);
        concept.use_count += 1;
        concept.last_used = creation_time;

        FiledEvent { concept_key: key, priority }
    }

    /// File an implication (`spec.md` §4.G `add_implication`): key by
    /// the postcondition's concept, pick the operation-indexed table,
    /// and revise against any existing implication with the same term.
    pub fn add_implication(&mut self, imp: Implication, registry: &OperationRegistry) -> u8 {
        let key = concept_key(imp.postcondition());
        let table_index = operation_index(imp.precondition(), registry);
        let term = imp.term().clone();

        self.index.add(&key, &term);
        let concept = self.get_or_create(key);
        concept.indexed_terms.insert(term.clone());

        let table = concept.table_mut(table_index);
        match table.get(&term) {
            Some(existing) if !existing.stamp.overlaps(&imp.stamp) => {
                let revised = existing.revise(&imp);
                table.insert(term, revised);
            }
            Some(_) => {} // StampOverlap: revision rejected, input silently skipped.
            None => {
                if table.len() >= TABLE_CAP {
                    table.shift_remove_index(0);
                }
                table.insert(term, imp);
            }
        }
        table_index
    }

    /// Concepts related to `term` via the inverted atom index.
    pub fn related_concepts(&self, term: &Term) -> HashSet<Term> {
        self.index.related_concepts(term)
    }

    /// Multiply every concept's priority by `durability`, clipping to
    /// `[0,1]` (`spec.md` §5 priority decay).
    pub fn decay_priorities(&mut self, durability: f64) {
        for concept in self.concepts.values_mut() {
            concept.priority = (concept.priority * durability).clamp(0.0, 1.0);
        }
    }

    /// Evict the lowest `priority·usefulness` concept until `len() <=
    /// cap` (`spec.md` §5 resource bounds).
    pub fn enforce_capacity(&mut self, cap: usize) {
        while self.concepts.len() > cap {
            let worst = self
                .concepts
                .iter()
                .min_by(|a, b| score(a.1).partial_cmp(&score(b.1)).unwrap())
                .map(|(k, _)| k.clone());
            match worst {
                Some(key) => self.evict(&key),
                None => break,
            }
        }
    }

    fn evict(&mut self, key: &Term) {
        if let Some(concept) = self.concepts.shift_remove(key) {
            for term in &concept.indexed_terms {
                self.index.remove(key, term);
            }
        }
    }
}

fn score(c: &Concept) -> f64 {
    c.priority * c.usefulness
}

/// Revise two eternal belief events with disjoint stamps into one:
/// combine truths, union stamps, keep the newer term and the later
/// creation time.
fn revise_belief_events(existing: &Event, incoming: &Event) -> Event {
    Event::new(
        incoming.term.clone(),
        EventKind::Belief,
        crate::truth::revision(existing.truth, incoming.truth),
        existing.stamp.union(&incoming.stamp),
        incoming.occurrence_time,
        existing.creation_time.max(incoming.creation_time),
        existing.flags | incoming.flags,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventFlags, Stamp};
    use crate::operation::OperationRegistry;
    use crate::parser;
    use crate::truth::Truth;

    fn belief_event(term: &str, stamp_id: u64, occurrence: i64) -> Event {
        Event::new(
            parser::parse(term).unwrap(),
            EventKind::Belief,
            Truth::default_input(),
            Stamp::new(stamp_id),
            occurrence,
            0,
            EventFlags::INPUT,
        )
    }

    #[test]
    fn concept_key_of_inheritance_is_the_subject() {
        let t = parser::parse("<context --> a>").unwrap();
        assert_eq!(concept_key(&t), Term::atom("context"));
    }

    #[test]
    fn concept_key_of_other_terms_is_the_term_itself() {
        let t = parser::parse("(a &/ ^left)").unwrap();
        assert_eq!(concept_key(&t), t);
    }

    #[test]
    fn add_event_sets_belief_spike_for_temporal_belief() {
        let mut mem = ConceptMemory::new();
        let outcome = mem.add_event(belief_event("red", 1, 5));
        let concept = mem.get(&outcome.concept_key).unwrap();
        assert!(concept.belief_spike.is_some());
        assert!(concept.belief.is_none());
    }

    #[test]
    fn add_event_indexes_every_atom() {
        let mut mem = ConceptMemory::new();
        mem.add_event(belief_event("<bird --> flyer>", 1, crate::event::ETERNAL));
        let related = mem.related_concepts(&Term::atom("flyer"));
        assert!(related.contains(&Term::atom("bird")));
    }

    #[test]
    fn table_insertion_evicts_the_oldest_entry_once_past_the_cap() {
        let mut mem = ConceptMemory::new();
        let registry = OperationRegistry::new();
        for i in 0..=TABLE_CAP {
            let term = parser::parse(&format!("<a{i} =/> goal>")).unwrap();
            let imp = crate::implication::Implication::new(term, Truth::default_input(), Stamp::new(i as u64), 1.0, 0);
            mem.add_implication(imp, &registry);
        }
        let concept = mem.get(&Term::atom("goal")).unwrap();
        assert_eq!(concept.table(0).len(), TABLE_CAP);
        assert!(concept.table(0).get(&parser::parse("<a0 =/> goal>").unwrap()).is_none());
        assert!(concept.table(0).get(&parser::parse(&format!("<a{TABLE_CAP} =/> goal>")).unwrap()).is_some());
    }

    #[test]
    fn enforce_capacity_evicts_lowest_score() {
        let mut mem = ConceptMemory::new();
        mem.add_event(belief_event("a", 1, 1));
        mem.add_event(belief_event("b", 2, 1));
        mem.get_mut(&Term::atom("a")).unwrap().priority = 0.1;
        mem.get_mut(&Term::atom("b")).unwrap().priority = 0.9;
        mem.enforce_capacity(1);
        assert_eq!(mem.len(), 1);
        assert!(mem.get(&Term::atom("b")).is_some());
        assert!(mem.get(&Term::atom("a")).is_none());
    }

    #[test]
    fn bump_usefulness_raises_and_clamps() {
        let mut concept = Concept::new(Term::atom("a"));
        assert_eq!(concept.usefulness, 0.5);
        for _ in 0..10 {
            concept.bump_usefulness();
        }
        assert_eq!(concept.usefulness, 1.0);
    }

    #[test]
    fn enforce_capacity_prefers_keeping_the_more_useful_concept_at_equal_priority() {
        let mut mem = ConceptMemory::new();
        mem.add_event(belief_event("a", 1, 1));
        mem.add_event(belief_event("b", 2, 1));
        mem.get_mut(&Term::atom("a")).unwrap().priority = 0.5;
        mem.get_mut(&Term::atom("b")).unwrap().priority = 0.5;
        mem.get_mut(&Term::atom("b")).unwrap().bump_usefulness();
        mem.enforce_capacity(1);
        assert!(mem.get(&Term::atom("b")).is_some());
        assert!(mem.get(&Term::atom("a")).is_none());
    }
}
