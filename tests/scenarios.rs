//! End-to-end reasoning scenarios driven purely through the public
//! surface (`ona::state::NarState`, `ona::protocol`, `ona::parser`) —
//! no access to crate-internal concept tables, so these exercise
//! exactly what an embedder can see.

use ona::config::Config;
use ona::parser;
use ona::query::AnswerContent;
use ona::state::NarState;
use ona::term::Term;
use ona::truth::Truth;

/// Feed a single observed pattern (a color, then an operation, then
/// the achieved goal) close together in time so the cycle mines a
/// procedural implication from it; resubmit the color and ask for the
/// goal, and the same operation should fire again.
#[test]
fn learns_a_single_pattern_and_executes_it_for_a_matching_goal() {
    let mut state = NarState::init(Config::default());
    state
        .register_operation(Term::operation("left"), Box::new(|_| Ok(Term::atom("left_done"))))
        .unwrap();

    state.add_belief(parser::parse("red").unwrap(), Truth::default_input(), false);
    state.cycle(1);
    state.add_belief(parser::parse("^left").unwrap(), Truth::default_input(), false);
    state.cycle(1);
    state.add_belief(parser::parse("<goal --> achieved>").unwrap(), Truth::default_input(), false);
    state.cycle(20);

    state.add_belief(parser::parse("red").unwrap(), Truth::default_input(), false);
    state.cycle(1);
    state.add_goal(parser::parse("<goal --> achieved>").unwrap(), Truth::default_input(), false);
    state.cycle(5);

    assert_eq!(state.last_executed_operation, Some(Term::operation("left")));
}

/// The same scenario driven through the textual protocol instead of
/// the Rust API directly, matching the shell transcript an embedder
/// would actually type.
#[test]
fn the_textual_protocol_reproduces_the_same_single_pattern_execution() {
    use ona::protocol::{self, ProtocolOutcome};

    let mut state = NarState::init(Config::default());
    state
        .register_operation(Term::operation("left"), Box::new(|_| Ok(Term::atom("left_done"))))
        .unwrap();

    for line in ["*setopname 1 ^left", "red. :|:", "1", "^left. :|:", "1", "<goal --> achieved>. :|:", "20"] {
        let outcome = protocol::process_line(&mut state, line);
        assert!(!matches!(outcome, ProtocolOutcome::Error(_)), "{line} -> {outcome:?}");
    }
    protocol::process_line(&mut state, "red. :|:");
    protocol::process_line(&mut state, "1");
    protocol::process_line(&mut state, "<goal --> achieved>! :|:");
    protocol::process_line(&mut state, "5");

    assert_eq!(state.last_executed_operation, Some(Term::operation("left")));
}

/// After observing `A`, `^op`, and `B` in sequence, asking the exact
/// compound implication back should answer with a high-frequency,
/// positive-confidence truth — the question-answering round trip over
/// something the cycle itself derived, not something hand-fed in.
#[test]
fn a_mined_procedural_implication_answers_the_question_that_names_it() {
    let mut state = NarState::init(Config::default());
    state.register_operation(Term::operation("op"), Box::new(|_| Ok(Term::atom("done")))).unwrap();

    state.add_belief(parser::parse("a").unwrap(), Truth::default_input(), false);
    state.cycle(1);
    state.add_belief(parser::parse("^op").unwrap(), Truth::default_input(), false);
    state.cycle(1);
    state.add_belief(parser::parse("b").unwrap(), Truth::default_input(), false);
    state.cycle(1);

    let query = parser::parse("<(a &/ ^op) =/> b>").unwrap();
    let answers = state.ask(&query);
    let truth = answers
        .iter()
        .find_map(|a| match &a.content {
            AnswerContent::Implication(imp) if imp.term() == &query => Some(imp.truth),
            _ => None,
        })
        .expect("the mined implication should answer the query that names it");

    assert!((truth.frequency() - 1.0).abs() < 1e-6);
    assert!(truth.confidence() > 0.0);
}

/// A belief with no answer in memory comes back empty rather than
/// panicking or synthesizing a guess.
#[test]
fn an_unasked_question_returns_no_answers() {
    let mut state = NarState::init(Config::default());
    state.add_belief(parser::parse("red").unwrap(), Truth::default_input(), false);
    let answers = state.ask(&parser::parse("<nothing --> known>").unwrap());
    assert!(answers.is_empty());
}

/// A handful of terms whose top-level copula is ambiguous with the
/// `>` that could otherwise close an enclosing bracket: `-->`, `==>`,
/// and `=/>` must each parse as a single two-character-plus-angle
/// copula, not be mistaken for the bracket's own close.
#[test]
fn nested_terms_with_copula_ambiguous_brackets_round_trip_through_the_parser() {
    let cases = [
        "<bird --> animal>",
        "<<bird --> animal> ==> <bird --> flyer>>",
        "<(a &/ ^op) =/> b>",
        "<<a --> b> =/> <c --> d>>",
    ];
    for text in cases {
        let term = parser::parse(text).expect("should parse");
        assert_eq!(parser::format(&term), text, "round trip for {text}");
    }
}
