//! Cycle: the inference driver (`spec.md` §4.J).
//!
//! One call to [`step`] pops the cycling events, validates any pending
//! predictions, mines sequences/implications from input beliefs,
//! forward-chains to produce new predictions, runs the decision maker
//! over the selected goals, resolves timed-out anticipations, and
//! advances the logical clock. Steps run in the strict order `spec.md`
//! requires: belief processing (validate → mine → forward-chain)
//! entirely before goal processing, so derivations made this cycle are
//! visible to the decision step.

use crate::concept;
use crate::decision;
use crate::event::{self, Event, EventFlags, EventKind, Stamp, ETERNAL};
use crate::implication::Implication;
use crate::prediction::{self, Prediction, Validation};
use crate::state::NarState;
use crate::term::{Copula, Term};
use crate::truth::{self, Truth};
use crate::unify;
use hashbrown::HashSet;

/// Run one inference cycle against `state` (`spec.md` §4.J steps 1-5).
pub fn step(state: &mut NarState) {
    let beliefs = state.belief_queue.pop_n(state.config.belief_event_selections);
    let goals = state.goal_queue.pop_n(state.config.goal_event_selections);

    for belief in &beliefs {
        validate_prediction(state, belief);
        mine_sequences_and_implications(state, belief);
        forward_chain(state, belief);
    }

    for goal in &goals {
        process_goal(state, goal);
    }

    check_anticipations(state);

    state.memory.decay_priorities(state.config.concept_durability);
    state.belief_queue.decay(state.config.event_durability);
    state.goal_queue.decay(state.config.event_durability);

    state.config.current_time += 1;
}

fn fresh_stamp(state: &mut NarState) -> Stamp {
    let id = state.config.stamp_id;
    state.config.stamp_id += 1;
    Stamp::new(id)
}

fn enqueue_belief(state: &mut NarState, term: Term, truth: Truth, stamp: Stamp, occurrence_time: i64, flags: EventFlags) {
    let event = Event::new(term, EventKind::Belief, truth, stamp, occurrence_time, state.config.current_time, flags);
    let filed = state.memory.add_event(event.clone());
    state.belief_queue.push(event, filed.priority);
}

fn enqueue_goal(state: &mut NarState, term: Term, truth: Truth, stamp: Stamp, occurrence_time: i64, flags: EventFlags) {
    let event = Event::new(term, EventKind::Goal, truth, stamp, occurrence_time, state.config.current_time, flags);
    let filed = state.memory.add_event(event.clone());
    state.goal_queue.push(event, filed.priority);
}

/// §4.J step 2, bullet 1: if the concept for `belief`'s term has an
/// active prediction, validate it against the arriving belief and, on
/// a terminal outcome, revise the source implication and clear the
/// prediction. Runs before mining/forward-chaining so the prediction
/// is consumed before this belief updates any spikes.
fn validate_prediction(state: &mut NarState, belief: &Event) {
    let key = concept::concept_key(&belief.term);
    let tolerance = state.config.prediction_tolerance;
    let now = state.config.current_time;

    let Some(concept) = state.memory.get(&key) else { return };
    let Some(prediction) = concept.active_prediction.clone() else { return };

    match prediction::validate(&prediction, belief, now, tolerance) {
        Validation::Confirmed => {
            log::info!("prediction confirmed: {}", prediction.source_implication);
            revise_source_implication(state, &prediction, Validation::Confirmed);
            clear_prediction(state, &key);
        }
        outcome @ (Validation::Refuted | Validation::Timeout) => {
            log::info!("prediction {:?}: {}", outcome, prediction.source_implication);
            revise_source_implication(state, &prediction, outcome);
            clear_prediction(state, &key);
        }
        Validation::AlreadyResolved | Validation::Pending => {}
    }
}

fn clear_prediction(state: &mut NarState, key: &Term) {
    if let Some(concept) = state.memory.get_mut(key) {
        concept.active_prediction = None;
    }
}

fn revise_source_implication(state: &mut NarState, prediction: &Prediction, outcome: Validation) {
    let term = &prediction.source_implication;
    let Some(precondition) = term.get_subject() else { return };
    let table_idx = concept::operation_index(precondition, &state.registry);

    if let Some(concept) = state.memory.get_mut(&prediction.source_concept_key) {
        let table = concept.table_mut(table_idx);
        if let Some(existing) = table.get(term) {
            let revised = if outcome == Validation::Confirmed {
                prediction::revise_on_confirmation(existing)
            } else {
                prediction::revise_on_refutation(existing)
            };
            table.insert(term.clone(), revised);
        }
        if outcome == Validation::Confirmed {
            concept.bump_usefulness();
        }
    }
}

/// §4.J step 2, bullet 2: mine a sequence event and a temporal
/// implication from every other concept's recent-enough belief spike,
/// but only when `belief` is itself an input, temporal, non-eternal
/// belief — otherwise a derived belief could chain into itself forever.
fn mine_sequences_and_implications(state: &mut NarState, belief: &Event) {
    if !belief.is_input() || belief.is_eternal() {
        return;
    }

    let max_timediff = state.config.max_sequence_timediff;
    let max_seq_len = state.config.max_sequence_len;
    let beta = state.config.truth_projection_decay;

    let candidates: Vec<Event> = state
        .memory
        .iter()
        .filter_map(|(_, c)| c.belief_spike.clone())
        .filter(|s| {
            !s.is_eternal()
                && s.occurrence_time < belief.occurrence_time
                && belief.occurrence_time - s.occurrence_time <= max_timediff
                && (s.is_input() || (s.term.is_sequence() && s.term.sequence_length() < max_seq_len))
        })
        .collect();

    for s in candidates {
        let projected = s.project(belief.occurrence_time, beta);
        let stamp = s.stamp.union(&belief.stamp);

        let seq_term = Term::compound(Copula::Sequence, s.term.clone(), belief.term.clone());
        let seq_truth = truth::intersection(projected.truth, belief.truth);
        enqueue_belief(state, seq_term, seq_truth, stamp.clone(), belief.occurrence_time, EventFlags::empty());

        let imp_term = Term::compound(Copula::TemporalImplication, s.term.clone(), belief.term.clone());
        let imp_truth = truth::induction(belief.truth, projected.truth);
        let offset = (belief.occurrence_time - s.occurrence_time) as f64;
        let imp = Implication::new(imp_term, imp_truth, stamp, offset, state.config.current_time);
        log::debug!("mined implication {}", imp.term());
        state.memory.add_implication(imp, &state.registry);
    }
}

/// §4.J step 2, bullet 3: for every concept related to `belief`'s term
/// (via the inverted atom index) plus every concept whose key carries
/// a variable, unify the belief against each stored implication's
/// precondition and record a prediction for any that match. The table
/// scope (0..10 vs 1..10) is the named config flag from `spec.md` §9
/// open question 1.
fn forward_chain(state: &mut NarState, belief: &Event) {
    let mut keys: HashSet<Term> = state.memory.related_concepts(&belief.term);
    for (key, _) in state.memory.iter() {
        if unify::has_variable(key) {
            keys.insert(key.clone());
        }
    }

    let all_tables = state.config.forward_chain_all_tables;
    let mut candidates: Vec<(Term, Implication)> = Vec::new();
    for key in &keys {
        let Some(concept) = state.memory.get(key) else { continue };
        if all_tables {
            candidates.extend(concept.iterate_implications().cloned().map(|imp| (key.clone(), imp)));
        } else {
            candidates.extend(concept.iterate_procedural().cloned().map(|imp| (key.clone(), imp)));
        }
    }

    for (source_key, imp) in candidates {
        let Some(bindings) = unify::unify(imp.precondition(), &belief.term) else { continue };
        let postcondition = unify::substitute(imp.postcondition(), &bindings);
        let predicted_truth = truth::deduction(imp.truth, belief.truth);
        let predicted_time = (belief.occurrence_time as f64 + imp.occurrence_time_offset).round() as i64;
        let stamp = imp.stamp.union(&belief.stamp);

        let predicted_event = Event::new(
            postcondition.clone(),
            EventKind::Belief,
            predicted_truth,
            stamp,
            predicted_time,
            state.config.current_time,
            EventFlags::empty(),
        );

        let predicted_key = concept::concept_key(&postcondition);
        let prediction = Prediction::new(
            predicted_event.clone(),
            imp.term().clone(),
            source_key,
            predicted_time,
            state.config.current_time,
        );

        let concept = state.memory.get_or_create(predicted_key.clone());
        concept.predicted_belief = Some(predicted_event);
        concept.active_prediction = Some(prediction);
        if !state.anticipations.contains(&predicted_key) {
            state.anticipations.push(predicted_key);
        }
    }
}

/// §4.J step 3: ask the decision maker for each selected goal; execute
/// a chosen operation or, failing that, derive subgoals.
fn process_goal(state: &mut NarState, goal: &Event) {
    let decision = decision::decide(state, goal);

    if decision.execute {
        if let Some(op_term) = decision.operation_term.clone() {
            if let Some(op) = state.registry.get_by_term(&op_term) {
                let id = op.id;
                if let Some(outcome) = state.registry.execute(id, &[]) {
                    log::info!("execute {} desire={:.3}", outcome.executed_term, decision.desire);
                    let truth = if outcome.success {
                        Truth::new(1.0, 0.9)
                    } else {
                        Truth::new(0.0, 0.9)
                    };
                    let stamp = fresh_stamp(state);
                    let now = state.config.current_time;
                    enqueue_belief(state, outcome.executed_term.clone(), truth, stamp, now, EventFlags::EXECUTED);
                    state.last_executed_operation = Some(outcome.executed_term);
                    if outcome.success {
                        let goal_key = concept::concept_key(&goal.term);
                        if let Some(concept) = state.memory.get_mut(&goal_key) {
                            concept.bump_usefulness();
                        }
                    }
                }
                return;
            }
        }
    }

    derive_subgoals(state, goal);
}

/// §4.J step 3, last bullet: `goal_deduction` over every implication
/// whose postcondition unifies with `goal`'s term.
fn derive_subgoals(state: &mut NarState, goal: &Event) {
    let key = concept::concept_key(&goal.term);
    let Some(concept) = state.memory.get(&key) else { return };

    let matches: Vec<(Implication, unify::Bindings)> = concept
        .iterate_implications()
        .filter_map(|imp| unify::unify(imp.postcondition(), &goal.term).map(|b| (imp.clone(), b)))
        .collect();

    for (imp, bindings) in matches {
        let subgoal_term = unify::substitute(imp.precondition(), &bindings);
        let subgoal_truth = decision::goal_deduction(goal.truth, imp.truth);
        let subgoal_time = if goal.is_eternal() {
            ETERNAL
        } else {
            (goal.occurrence_time as f64 - imp.occurrence_time_offset).round() as i64
        };
        let stamp = goal.stamp.union(&imp.stamp);
        enqueue_goal(state, subgoal_term, subgoal_truth, stamp, subgoal_time, EventFlags::empty());
    }
}

/// §4.J step 4: anticipations are predictions tracked independently of
/// any arriving belief, so a precondition that fires without its
/// expected postcondition ever showing up still gets resolved once its
/// deadline passes.
fn check_anticipations(state: &mut NarState) {
    let now = state.config.current_time;
    let tolerance = state.config.prediction_tolerance;
    let pending = std::mem::take(&mut state.anticipations);
    let mut still_active = Vec::with_capacity(pending.len());

    for key in pending {
        let Some(concept) = state.memory.get(&key) else { continue };
        let Some(prediction) = concept.active_prediction.clone() else { continue };
        if prediction.confirmed || prediction.refuted {
            continue;
        }
        let deadline_passed =
            !prediction.predicted_event.is_eternal() && now > prediction.expected_time + tolerance;
        if deadline_passed {
            apply_negative_confirmation(state, &prediction);
            clear_prediction(state, &key);
        } else {
            still_active.push(key);
        }
    }
    state.anticipations = still_active;
}

/// `add_negative_confirmation` (`spec.md` §4.J step 4): revise the
/// source implication with `(0.0, ANTICIPATION_CONFIDENCE)` induced
/// against the precondition's current belief.
fn apply_negative_confirmation(state: &mut NarState, prediction: &Prediction) {
    let term = prediction.source_implication.clone();
    let Some(precondition) = term.get_subject().cloned() else { return };
    let precondition_key = concept::concept_key(&precondition);
    let now = state.config.current_time;
    let beta = state.config.truth_projection_decay;

    let precondition_truth = state
        .memory
        .get(&precondition_key)
        .and_then(|c| event::select_belief(c.belief.as_ref(), c.belief_spike.as_ref(), now, beta))
        .map(|e| e.truth);
    let Some(precondition_truth) = precondition_truth else { return };

    let negative = Truth::new(0.0, state.config.anticipation_confidence);
    let new_evidence_truth = truth::induction(negative, precondition_truth);

    let op_idx = concept::operation_index(&precondition, &state.registry);
    let existing_offset = state
        .memory
        .get(&prediction.source_concept_key)
        .and_then(|c| c.table(op_idx).get(&term))
        .map(|imp| imp.occurrence_time_offset)
        .unwrap_or(0.0);

    let stamp = fresh_stamp(state);
    let imp = Implication::new(term, new_evidence_truth, stamp, existing_offset, state.config.current_time);
    log::debug!("anticipation timeout, negative confirmation: {}", imp.term());
    state.memory.add_implication(imp, &state.registry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser;

    fn input_belief(state: &mut NarState, term: &str, time: i64) {
        state.config.current_time = time;
        state.add_belief(parser::parse(term).unwrap(), Truth::default_input(), false);
    }

    #[test]
    fn mining_produces_a_sequence_and_an_implication() {
        let mut state = NarState::init(Config::default());
        input_belief(&mut state, "red", 0);
        state.cycle(1);
        input_belief(&mut state, "goal", 1);
        state.cycle(1);

        let seq = parser::parse("(red &/ goal)").unwrap();
        assert!(state.memory.get(&seq).is_some(), "expected a mined sequence concept");

        let goal_concept = state.memory.get(&parser::parse("goal").unwrap()).unwrap();
        assert!(goal_concept.table(0).values().any(|imp| imp.precondition() == &Term::atom("red")));
    }

    #[test]
    fn forward_chaining_predicts_the_postcondition() {
        let mut state = NarState::init(Config::default());
        let imp = Implication::new(
            parser::parse("<a =/> b>").unwrap(),
            Truth::new(1.0, 0.9),
            Stamp::new(99),
            1.0,
            0,
        );
        state.memory.add_implication(imp, &state.registry);

        input_belief(&mut state, "a", 0);
        state.cycle(1);

        let b = state.memory.get(&Term::atom("b")).unwrap();
        assert!(b.predicted_belief.is_some());
        assert!(b.active_prediction.is_some());
    }

    #[test]
    fn prediction_confirmation_raises_the_implication_confidence() {
        let mut state = NarState::init(Config::default());
        let imp = Implication::new(
            parser::parse("<a =/> b>").unwrap(),
            Truth::new(0.9, 0.5),
            Stamp::new(99),
            1.0,
            0,
        );
        state.memory.add_implication(imp, &state.registry);

        input_belief(&mut state, "a", 0);
        state.cycle(1);
        input_belief(&mut state, "b", 1);
        state.cycle(1);

        let b = state.memory.get(&Term::atom("b")).unwrap();
        let revised = b.table(0).get(&parser::parse("<a =/> b>").unwrap()).unwrap();
        assert!(revised.truth.confidence() >= 0.5);
    }

    #[test]
    fn anticipation_timeout_lowers_frequency_without_the_postcondition_arriving() {
        let mut state = NarState::init(Config::default());
        let imp = Implication::new(
            parser::parse("<a =/> b>").unwrap(),
            Truth::new(0.9, 0.9),
            Stamp::new(99),
            1.0,
            0,
        );
        state.memory.add_implication(imp, &state.registry);

        input_belief(&mut state, "a", 0);
        for t in 1..30 {
            state.config.current_time = t;
            state.cycle(1);
        }

        let b = state.memory.get(&Term::atom("b")).unwrap();
        let revised = b.table(0).get(&parser::parse("<a =/> b>").unwrap()).unwrap();
        assert!(revised.truth.frequency() < 0.9);
    }
}
