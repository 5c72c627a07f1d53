//! Prediction tracking: an implication's forecast, pending validation
//! against what's actually observed (`spec.md` §4.H).

use crate::event::Event;
use crate::implication::Implication;
use crate::term::Term;
use crate::truth::Truth;

/// Default tolerance (in ticks) for matching a prediction to an
/// observed event.
pub const DEFAULT_TOLERANCE: i64 = 5;

/// Maximum frequency gap between predicted and observed truth still
/// counted as a match.
const TRUTH_MATCH_TOLERANCE: f64 = 0.5;

/// The truth revised into a source implication on confirmation.
pub const CONFIRMATION_TRUTH: (f64, f64) = (1.0, 0.1);
/// The truth revised into a source implication on refutation.
pub const REFUTATION_TRUTH: (f64, f64) = (0.0, 0.1);

#[derive(Debug, Clone)]
pub struct Prediction {
    pub predicted_event: Event,
    pub source_implication: Term,
    pub source_concept_key: Term,
    pub expected_time: i64,
    pub creation_time: i64,
    pub confirmed: bool,
    pub refuted: bool,
}

impl Prediction {
    pub fn new(
        predicted_event: Event,
        source_implication: Term,
        source_concept_key: Term,
        expected_time: i64,
        creation_time: i64,
    ) -> Self {
        Prediction {
            predicted_event,
            source_implication,
            source_concept_key,
            expected_time,
            creation_time,
            confirmed: false,
            refuted: false,
        }
    }

    fn is_eternal(&self) -> bool {
        self.predicted_event.is_eternal()
    }

    /// Same term AND (eternal OR within `tolerance` ticks of the
    /// expected time).
    pub fn matches(&self, observed: &Event, tolerance: i64) -> bool {
        self.predicted_event.term == observed.term
            && (self.is_eternal() || (observed.occurrence_time - self.expected_time).abs() <= tolerance)
    }

    /// Whether the predicted and observed frequencies agree closely
    /// enough to count as a confirmation rather than a refutation.
    pub fn truth_match(&self, observed: &Event) -> bool {
        (self.predicted_event.truth.frequency() - observed.truth.frequency()).abs()
            <= TRUTH_MATCH_TOLERANCE
    }
}

/// The outcome of validating a prediction against an observed event or
/// the passage of time (`spec.md` §4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    AlreadyResolved,
    Confirmed,
    Refuted,
    Timeout,
    Pending,
}

pub fn validate(prediction: &Prediction, observed: &Event, now: i64, tolerance: i64) -> Validation {
    if prediction.confirmed || prediction.refuted {
        return Validation::AlreadyResolved;
    }
    if prediction.matches(observed, tolerance) {
        return if prediction.truth_match(observed) {
            Validation::Confirmed
        } else {
            Validation::Refuted
        };
    }
    if !prediction.is_eternal() && now > prediction.expected_time + tolerance {
        return Validation::Timeout;
    }
    Validation::Pending
}

/// Revise the source implication with confirming evidence `(1.0, 0.1)`.
pub fn revise_on_confirmation(imp: &Implication) -> Implication {
    revise_with(imp, CONFIRMATION_TRUTH)
}

/// Revise the source implication with refuting evidence `(0.0, 0.1)`.
pub fn revise_on_refutation(imp: &Implication) -> Implication {
    revise_with(imp, REFUTATION_TRUTH)
}

fn revise_with(imp: &Implication, (f, c): (f64, f64)) -> Implication {
    let evidence = Implication::new(
        imp.term().clone(),
        Truth::new(f, c),
        crate::event::Stamp::new(0),
        imp.occurrence_time_offset,
        imp.creation_time,
    );
    Implication::new(
        imp.term().clone(),
        crate::truth::revision(imp.truth, evidence.truth),
        imp.stamp.clone(),
        imp.occurrence_time_offset,
        imp.creation_time,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventFlags, EventKind, Stamp, ETERNAL};
    use crate::parser;

    fn event(term: &str, f: f64, c: f64, occurrence: i64) -> Event {
        Event::new(
            parser::parse(term).unwrap(),
            EventKind::Belief,
            Truth::new(f, c),
            Stamp::new(1),
            occurrence,
            0,
            EventFlags::empty(),
        )
    }

    fn prediction(term: &str, f: f64, c: f64, expected: i64) -> Prediction {
        Prediction::new(
            event(term, f, c, expected),
            parser::parse("<a =/> b>").unwrap(),
            Term::atom("b"),
            expected,
            0,
        )
    }

    #[test]
    fn confirmed_when_matching_and_truth_agrees() {
        let p = prediction("b", 0.9, 0.8, 10);
        let observed = event("b", 0.95, 0.5, 11);
        assert_eq!(validate(&p, &observed, 12, 5), Validation::Confirmed);
    }

    #[test]
    fn refuted_when_matching_but_truth_disagrees() {
        let p = prediction("b", 0.9, 0.8, 10);
        let observed = event("b", 0.1, 0.5, 11);
        assert_eq!(validate(&p, &observed, 12, 5), Validation::Refuted);
    }

    #[test]
    fn timeout_past_deadline_without_match() {
        let p = prediction("b", 0.9, 0.8, 10);
        let observed = event("c", 0.9, 0.5, 20);
        assert_eq!(validate(&p, &observed, 20, 5), Validation::Timeout);
    }

    #[test]
    fn pending_when_within_window_but_no_match() {
        let p = prediction("b", 0.9, 0.8, 10);
        let observed = event("c", 0.9, 0.5, 11);
        assert_eq!(validate(&p, &observed, 12, 5), Validation::Pending);
    }

    #[test]
    fn already_resolved_takes_priority() {
        let mut p = prediction("b", 0.9, 0.8, 10);
        p.confirmed = true;
        let observed = event("b", 0.9, 0.8, 11);
        assert_eq!(validate(&p, &observed, 12, 5), Validation::AlreadyResolved);
    }

    #[test]
    fn eternal_prediction_ignores_time_window() {
        let p = prediction("b", 0.9, 0.8, ETERNAL);
        let observed = event("b", 0.9, 0.8, 1000);
        assert_eq!(validate(&p, &observed, 1000, 5), Validation::Confirmed);
    }

    #[test]
    fn revise_on_refutation_lowers_frequency() {
        let imp = Implication::new(
            parser::parse("<a =/> b>").unwrap(),
            Truth::new(0.9, 0.8),
            Stamp::new(1),
            2.0,
            0,
        );
        let revised = revise_on_refutation(&imp);
        assert!(revised.truth.frequency() < imp.truth.frequency());
    }
}
