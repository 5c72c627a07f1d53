//! Decision maker: picks an operation to pursue a goal, or decides none
//! applies (`spec.md` §4.K).

use crate::event::Event;
use crate::state::NarState;
use crate::term::Term;
use crate::truth::{self, Truth};
use crate::unify;

/// Fixed desire assigned to a motor-babbling decision.
const MOTOR_BABBLING_DESIRE: f64 = 0.6;

/// `(operation_term, desire, execute?)` — the outcome of deciding what,
/// if anything, to do about a goal. `None` operation with desire `0`
/// is the null decision (`spec.md` §4.K).
#[derive(Debug, Clone)]
pub struct Decision {
    pub operation_term: Option<Term>,
    pub desire: f64,
    pub execute: bool,
    pub specificity: usize,
}

impl Decision {
    fn null() -> Self {
        Decision {
            operation_term: None,
            desire: 0.0,
            execute: false,
            specificity: 0,
        }
    }
}

/// `deduction(I.truth, goal.truth)`, used both for the context-checked
/// desire calculation below and for subgoal derivation in the cycle.
pub fn goal_deduction(goal_truth: Truth, implication_truth: Truth) -> Truth {
    truth::deduction(implication_truth, goal_truth)
}

/// Decide what to do about `goal`: find procedural implications whose
/// postcondition matches it, rank the context-satisfied candidates by
/// `(specificity, desire)`, and fall back to motor babbling if
/// configured and not suppressed.
pub fn decide(state: &mut NarState, goal: &Event) -> Decision {
    let threshold = state.config.decision_threshold;
    let candidates = find_matching_implications(state, goal);
    let reasoned = best_candidate(candidates, threshold);

    if state.config.motor_babbling
        && reasoned.desire < state.config.motor_babbling_suppression_threshold
        && state.registry.len() > 0
    {
        use rand::Rng;
        if state.rng.gen_bool(state.config.motor_babbling_chance.clamp(0.0, 1.0)) {
            let ids: Vec<u8> = state.registry.ids().collect();
            let chosen = ids[state.rng.gen_range(0..ids.len())];
            let op = state.registry.get(chosen).expect("id came from the registry").name.clone();
            return Decision {
                operation_term: Some(op),
                desire: MOTOR_BABBLING_DESIRE,
                execute: true,
                specificity: 0,
            };
        }
    }

    reasoned
}

struct Candidate {
    specificity: usize,
    desire: f64,
    operation_term: Term,
}

/// Walk every concept's procedural tables (1..10 only — the decision
/// path never considers table 0, `spec.md` §9 open question 1), unify
/// each implication's postcondition against the goal, run the context
/// check, and compute a desire for every candidate that passes it.
fn find_matching_implications(state: &NarState, goal: &Event) -> Vec<Candidate> {
    let now = state.config.current_time;
    let distance = state.config.event_belief_distance;

    let mut out = Vec::new();
    for (_, concept) in state.memory.iter() {
        for imp in concept.iterate_procedural() {
            let Some(subst) = unify::unify(imp.postcondition(), &goal.term) else {
                continue;
            };
            let specialized_precondition = unify::substitute(imp.precondition(), &subst);

            let Some(operation_term) = operation_leaf(&specialized_precondition) else {
                continue; // Defensive: tables 1..10 are only ever filed this way.
            };

            let context_term = specialized_precondition.strip_operations_from_precondition();
            let components = context_term.flatten_sequence();

            let mut belief_input: Option<Event> = None;
            let mut all_recent = true;
            for component in &components {
                let key = crate::concept::concept_key(component);
                let recent = state.memory.get(&key).and_then(|c| {
                    c.belief_spike
                        .as_ref()
                        .filter(|spike| now - spike.occurrence_time <= distance)
                });
                match recent {
                    Some(spike) => {
                        if belief_input.is_none() {
                            belief_input = Some(spike.clone());
                        }
                    }
                    None => {
                        all_recent = false;
                        break;
                    }
                }
            }
            if !all_recent {
                continue;
            }
            let Some(belief_input) = belief_input else {
                continue;
            };

            let contextual = goal_deduction(goal.truth, imp.truth);
            let final_truth = truth::deduction(contextual, belief_input.truth);
            let desire = truth::expectation(final_truth.frequency(), final_truth.confidence());

            out.push(Candidate {
                specificity: components.len(),
                desire,
                operation_term,
            });
        }
    }
    out
}

/// The rightmost operation leaf of a (possibly bare) precondition
/// term, or `None` if it isn't one. Operation extraction must never
/// yield a compound term (`spec.md` §4.K, §8 testable property).
fn operation_leaf(precondition: &Term) -> Option<Term> {
    let leaf = precondition.rightmost_leaf();
    if leaf.is_operation() {
        Some(leaf.clone())
    } else {
        None
    }
}

/// Specificity first, desire as the tiebreak; the null decision if no
/// candidate passed the context check (`spec.md` §4.K).
fn best_candidate(candidates: Vec<Candidate>, decision_threshold: f64) -> Decision {
    let mut best = Decision::null();
    for c in candidates {
        let better = c.specificity > best.specificity
            || (c.specificity == best.specificity && c.desire > best.desire);
        if better {
            best = Decision {
                operation_term: Some(c.operation_term),
                desire: c.desire,
                execute: c.desire >= decision_threshold,
                specificity: c.specificity,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventFlags, EventKind, Stamp, ETERNAL};
    use crate::implication::Implication;
    use crate::parser;

    fn belief(state: &mut NarState, term: &str, occurrence: i64) {
        if occurrence != ETERNAL {
            state.config.current_time = occurrence;
        }
        state.add_belief(parser::parse(term).unwrap(), Truth::new(1.0, 0.9), occurrence == ETERNAL);
    }

    fn teach(state: &mut NarState, precondition: &str, postcondition: &str) {
        let term = parser::parse(&format!("<{precondition} =/> {postcondition}>")).unwrap();
        let imp = Implication::new(term, Truth::new(1.0, 0.9), Stamp::new(99), 1.0, 0);
        state.memory.add_implication(imp, &state.registry);
    }

    #[test]
    fn selects_the_registered_operation_for_a_matching_goal() {
        let mut state = NarState::init(default_config());
        state.register_operation(Term::operation("left"), Box::new(|_| Ok(Term::atom("ok")))).unwrap();
        belief(&mut state, "red", 0);
        teach(&mut state, "(red &/ ^left)", "goal");

        let goal = Event::new(
            parser::parse("goal").unwrap(),
            EventKind::Goal,
            Truth::new(1.0, 0.9),
            Stamp::new(1),
            0,
            0,
            EventFlags::INPUT,
        );
        let decision = decide(&mut state, &goal);
        assert_eq!(decision.operation_term, Some(Term::operation("left")));
        assert!(decision.execute);
    }

    fn goal_event(time: i64) -> Event {
        Event::new(
            parser::parse("goal").unwrap(),
            EventKind::Goal,
            Truth::new(1.0, 0.9),
            Stamp::new(1),
            time,
            time,
            EventFlags::INPUT,
        )
    }

    #[test]
    fn discriminates_between_two_learned_color_to_operation_patterns() {
        let mut state = NarState::init(default_config());
        state.register_operation(Term::operation("left"), Box::new(|_| Ok(Term::atom("ok")))).unwrap();
        state.register_operation(Term::operation("right"), Box::new(|_| Ok(Term::atom("ok")))).unwrap();
        teach(&mut state, "(red &/ ^left)", "goal");
        teach(&mut state, "(blue &/ ^right)", "goal");

        // Four alternating presentations, each separated far enough in
        // time that the previous color's spike has aged out of the
        // recent-belief window by the time the next one arrives.
        belief(&mut state, "red", 0);
        assert_eq!(decide(&mut state, &goal_event(0)).operation_term, Some(Term::operation("left")));

        belief(&mut state, "blue", 25);
        assert_eq!(decide(&mut state, &goal_event(25)).operation_term, Some(Term::operation("right")));

        belief(&mut state, "red", 50);
        assert_eq!(decide(&mut state, &goal_event(50)).operation_term, Some(Term::operation("left")));

        belief(&mut state, "blue", 75);
        assert_eq!(decide(&mut state, &goal_event(75)).operation_term, Some(Term::operation("right")));
    }

    #[test]
    fn compound_precondition_outranks_a_simpler_one_sharing_an_operation_component() {
        let mut state = NarState::init(default_config());
        state.register_operation(Term::operation("left"), Box::new(|_| Ok(Term::atom("ok")))).unwrap();
        state.register_operation(Term::operation("right"), Box::new(|_| Ok(Term::atom("ok")))).unwrap();

        // A two-component pattern, a same-shape distractor missing one
        // of its conditions entirely, and a one-component pattern that
        // shares a condition with the first but names the wrong
        // operation. Only specificity should decide this.
        teach(&mut state, "((red &/ bright) &/ ^left)", "goal");
        teach(&mut state, "((blue &/ bright) &/ ^right)", "goal");
        teach(&mut state, "(bright &/ ^right)", "goal");

        belief(&mut state, "red", 0);
        belief(&mut state, "bright", 0);

        let decision = decide(&mut state, &goal_event(0));
        assert_eq!(decision.operation_term, Some(Term::operation("left")));
        assert_eq!(decision.specificity, 2);
    }

    #[test]
    fn no_candidate_without_a_recent_belief_spike() {
        let mut state = NarState::init(default_config());
        state.register_operation(Term::operation("left"), Box::new(|_| Ok(Term::atom("ok")))).unwrap();
        teach(&mut state, "(red &/ ^left)", "goal");

        let goal = Event::new(
            parser::parse("goal").unwrap(),
            EventKind::Goal,
            Truth::new(1.0, 0.9),
            Stamp::new(1),
            0,
            0,
            EventFlags::INPUT,
        );
        let decision = decide(&mut state, &goal);
        assert!(decision.operation_term.is_none());
    }

    fn default_config() -> crate::config::Config {
        crate::config::Config::default()
    }
}
