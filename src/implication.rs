//! Temporal implications: `<A =/> B>` with a truth value and the mean
//! observed time offset between precondition and postcondition
//! (`spec.md` §3.4, §4.D).

use crate::event::Stamp;
use crate::term::Term;
use crate::truth::{self, Truth};

/// A learned or hand-taught implication.
#[derive(Debug, Clone)]
pub struct Implication {
    /// Always a temporal- or non-temporal implication compound.
    term: Term,
    pub truth: Truth,
    pub stamp: Stamp,
    /// Mean observed gap between precondition and postcondition
    /// occurrences.
    pub occurrence_time_offset: f64,
    pub creation_time: i64,
}

impl Implication {
    /// Build an implication. Panics if `term` is not an implication
    /// compound — malformed construction is a bug in the caller, not a
    /// recoverable condition (`spec.md` §7).
    pub fn new(term: Term, truth: Truth, stamp: Stamp, offset: f64, creation_time: i64) -> Self {
        assert!(
            term.is_implication(),
            "Implication::new requires an implication term, got {term}"
        );
        Implication {
            term,
            truth,
            stamp,
            occurrence_time_offset: offset,
            creation_time,
        }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn precondition(&self) -> &Term {
        self.term.get_subject().expect("implication has a subject")
    }

    pub fn postcondition(&self) -> &Term {
        self.term
            .get_predicate()
            .expect("implication has a predicate")
    }

    /// Revise two implications of the same term: revise truths,
    /// average the offsets, and keep the later creation time
    /// (`spec.md` §4.D). Callers are responsible for checking stamp
    /// disjointness first (`spec.md` §3.5 invariants).
    pub fn revise(&self, other: &Implication) -> Implication {
        debug_assert_eq!(self.term, other.term, "revising implications with different terms");
        Implication {
            term: self.term.clone(),
            truth: truth::revision(self.truth, other.truth),
            stamp: self.stamp.union(&other.stamp),
            occurrence_time_offset: (self.occurrence_time_offset + other.occurrence_time_offset)
                / 2.0,
            creation_time: self.creation_time.max(other.creation_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn imp(term: &str, f: f64, c: f64, offset: f64, stamp_id: u64) -> Implication {
        Implication::new(
            parser::parse(term).unwrap(),
            Truth::new(f, c),
            Stamp::new(stamp_id),
            offset,
            0,
        )
    }

    #[test]
    fn precondition_and_postcondition_are_subject_and_predicate() {
        let i = imp("<a =/> b>", 1.0, 0.9, 3.0, 1);
        assert_eq!(i.precondition(), &parser::parse("a").unwrap());
        assert_eq!(i.postcondition(), &parser::parse("b").unwrap());
    }

    #[test]
    fn revise_averages_offsets_and_keeps_later_creation_time() {
        let a = Implication::new(
            parser::parse("<a =/> b>").unwrap(),
            Truth::new(1.0, 0.5),
            Stamp::new(1),
            2.0,
            10,
        );
        let b = Implication::new(
            parser::parse("<a =/> b>").unwrap(),
            Truth::new(0.8, 0.5),
            Stamp::new(2),
            6.0,
            20,
        );
        let r = a.revise(&b);
        assert_eq!(r.occurrence_time_offset, 4.0);
        assert_eq!(r.creation_time, 20);
        assert!(r.truth.confidence() >= 0.5);
    }

    #[test]
    #[should_panic]
    fn new_panics_on_non_implication_term() {
        imp("red", 1.0, 0.9, 0.0, 1);
    }
}
