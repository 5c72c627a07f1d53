//! Query answering: `answer(state, query_term)` (`spec.md` §4.L).

use crate::event::Event;
use crate::implication::Implication;
use crate::state::NarState;
use crate::term::Term;
use crate::unify;
use hashbrown::HashSet;

/// What an [`Answer`] is actually reporting.
#[derive(Debug, Clone)]
pub enum AnswerContent {
    Belief(Event),
    Implication(Implication),
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub content: AnswerContent,
    pub expectation: f64,
}

/// Answer `query_term` against memory. Sorted by expectation
/// descending. Applies question priming (bumping the priority of
/// every concept an answer came from) as its only side effect
/// (`spec.md` §4.L, §8 round-trip property).
pub fn answer(state: &mut NarState, query_term: &Term) -> Vec<Answer> {
    let mut answers = Vec::new();
    let mut primed: HashSet<Term> = HashSet::new();

    // 1. Direct concept lookup: best-available event (spike > predicted
    //    > eternal).
    if let Some(concept) = state.memory.get(query_term) {
        let best = concept
            .belief_spike
            .clone()
            .or_else(|| concept.predicted_belief.clone())
            .or_else(|| concept.belief.clone());
        if let Some(event) = best {
            let expectation = event.truth.expectation();
            answers.push(Answer {
                content: AnswerContent::Belief(event),
                expectation,
            });
            primed.insert(query_term.clone());
        }
    }

    // 2. `<P =/> Q>` query: search the concept keyed by P for any
    //    implication whose predicate equals Q.
    if query_term.is_implication() {
        if let (Some(p), Some(q)) = (query_term.get_subject(), query_term.get_predicate()) {
            if let Some(concept) = state.memory.get(p) {
                for imp in concept.iterate_implications() {
                    if imp.postcondition() == q {
                        answers.push(Answer {
                            expectation: imp.truth.expectation(),
                            content: AnswerContent::Implication(imp.clone()),
                        });
                        primed.insert(p.clone());
                    }
                }
            }
        }
    }

    // 3. Unification search over every stored implication, enabling
    //    variable-bearing queries.
    for (key, concept) in state.memory.iter() {
        for imp in concept.iterate_implications() {
            if unify::unify(imp.term(), query_term).is_some() {
                answers.push(Answer {
                    expectation: imp.truth.expectation(),
                    content: AnswerContent::Implication(imp.clone()),
                });
                primed.insert(key.clone());
            }
        }
    }

    answers.sort_by(|a, b| b.expectation.partial_cmp(&a.expectation).unwrap());

    let priming = state.config.question_priming;
    for key in primed {
        if let Some(concept) = state.memory.get_mut(&key) {
            concept.priority = (concept.priority + priming).min(1.0);
        }
    }

    answers
}
