//! Minimal driver for the ONA reasoning core.
//!
//! A real deployment drives this crate from an external Narsese
//! shell, a native-image build, or a Python host wrapper (`spec.md`
//! §1) — none of which live here. This binary is just a smoke-test
//! harness over [`ona::protocol::process_line`] so the crate can be
//! exercised from a terminal.

use ona::config::Config;
use ona::protocol::{self, ProtocolOutcome};
use ona::state::NarState;
use ona::term::Term;

fn main() {
    let mut state = NarState::init(Config::default());
    state
        .register_operation(Term::operation("left"), Box::new(|_| Ok(Term::atom("left_done"))))
        .expect("first operation registration always succeeds");

    println!("ONA core — running the single-pattern execution script (spec.md §8 S1)");
    let script = [
        "*setopname 1 ^left",
        "red. :|:",
        "^left. :|:",
        "<goal --> achieved>. :|:",
        "20",
        "red. :|:",
        "<goal --> achieved>! :|:",
        "5",
    ];

    for line in script {
        let outcome = protocol::process_line(&mut state, line);
        report(line, &outcome);
    }

    let stats = state.stats();
    println!(
        "\nfinal: time={} concepts={} last_executed={:?}",
        stats.current_time, stats.total_concepts, state.last_executed_operation
    );
}

fn report(line: &str, outcome: &ProtocolOutcome) {
    match outcome {
        ProtocolOutcome::Cycled(n) => println!("{line:>40} -> ran {n} cycles"),
        ProtocolOutcome::BeliefAdded(t) => println!("{line:>40} -> belief {t}"),
        ProtocolOutcome::GoalAdded(t) => println!("{line:>40} -> goal {t}"),
        ProtocolOutcome::Answers(answers) => println!("{line:>40} -> {} answers", answers.len()),
        ProtocolOutcome::Reset => println!("{line:>40} -> reset"),
        ProtocolOutcome::Stats(s) => println!("{line:>40} -> {s:?}"),
        ProtocolOutcome::ConceptsDump(dump) => println!("{line:>40} ->\n{dump}"),
        ProtocolOutcome::ConfigUpdated => println!("{line:>40} -> config updated"),
        ProtocolOutcome::OperationRenamed { id, name } => {
            println!("{line:>40} -> operation {id} renamed to {name}")
        }
        ProtocolOutcome::Noop => {}
        ProtocolOutcome::Error(e) => eprintln!("{line:>40} -> error: {e}"),
    }
}
