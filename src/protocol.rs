//! Textual protocol front-end (`spec.md` §6).
//!
//! The Narsese read/print shell itself is an external collaborator
//! (`spec.md` §1) — this module only realizes the round-trip contract
//! the spec demands of the core: [`process_line`] is a pure `&str ->
//! ProtocolOutcome` function, so a future I/O loop can be a thin
//! wrapper around it without reimplementing any parsing or dispatch.
//! No stdin/stdout/logging side effects happen here beyond what the
//! cycle itself already does.

use crate::error::OnaError;
use crate::parser;
use crate::query::Answer;
use crate::state::{NarState, Stats};
use crate::term::Term;
use crate::truth::Truth;

/// What a protocol line did, for a caller to render.
#[derive(Debug)]
pub enum ProtocolOutcome {
    Cycled(usize),
    BeliefAdded(Term),
    GoalAdded(Term),
    Answers(Vec<Answer>),
    Reset,
    Stats(Stats),
    ConceptsDump(String),
    ConfigUpdated,
    OperationRenamed { id: u8, name: Term },
    Noop,
    Error(OnaError),
}

/// Process one line of the textual protocol against `state` (`spec.md`
/// §6): an input sentence, a bare cycle count, or a `*`-prefixed
/// directive.
pub fn process_line(state: &mut NarState, line: &str) -> ProtocolOutcome {
    let line = line.trim();
    if line.is_empty() {
        return ProtocolOutcome::Noop;
    }

    if let Ok(n) = line.parse::<usize>() {
        state.cycle(n);
        return ProtocolOutcome::Cycled(n);
    }

    if let Some(directive) = line.strip_prefix('*') {
        return process_directive(state, directive.trim());
    }

    process_sentence(state, line)
}

fn process_sentence(state: &mut NarState, line: &str) -> ProtocolOutcome {
    let Some((term_str, punct, rest)) = split_sentence(line) else {
        return ProtocolOutcome::Error(OnaError::Parse(parser::ParseError::Empty));
    };

    let term = match parser::parse(term_str) {
        Ok(t) => t,
        Err(e) => return ProtocolOutcome::Error(OnaError::Parse(e)),
    };

    let eternal = !rest.contains(":|:");
    let truth = extract_truth(rest).unwrap_or_else(Truth::default_input);

    match punct {
        '.' => {
            state.add_belief(term.clone(), truth, eternal);
            ProtocolOutcome::BeliefAdded(term)
        }
        '!' => {
            state.add_goal(term.clone(), truth, eternal);
            ProtocolOutcome::GoalAdded(term)
        }
        '?' => ProtocolOutcome::Answers(state.ask(&term)),
        other => ProtocolOutcome::Error(OnaError::Config {
            key: "sentence".to_string(),
            reason: format!("unrecognized sentence punctuation '{other}'"),
        }),
    }
}

/// Split a sentence line into `(term text, sentence punctuation,
/// trailing tense/truth text)`. Mirrors the bracket-depth rule
/// `parser::find_top_level_copula` uses (`>` closes a bracket only
/// when it isn't completing `-->`/`==>`/`=/>`) so that a bracketed
/// term's internal spaces around its copula don't get mistaken for the
/// boundary between the term and its punctuation.
fn split_sentence(line: &str) -> Option<(&str, char, &str)> {
    let positions: Vec<(usize, char)> = line.char_indices().collect();
    if positions.is_empty() {
        return None;
    }

    let bracketed = matches!(line.chars().next(), Some('<') | Some('('));
    let term_end = if bracketed {
        find_bracket_close(&positions, line)?
    } else {
        positions
            .iter()
            .find(|(_, c)| c.is_whitespace() || matches!(c, '.' | '!' | '?'))
            .map(|(i, _)| *i)
            .unwrap_or(line.len())
    };

    let term_str = &line[..term_end];
    let mut rest_chars = line[term_end..].chars();
    let punct = rest_chars.next()?;
    if !matches!(punct, '.' | '!' | '?') {
        return None;
    }
    let rest = rest_chars.as_str().trim();
    Some((term_str, punct, rest))
}

fn find_bracket_close(positions: &[(usize, char)], line: &str) -> Option<usize> {
    let mut depth: i32 = 0;
    for (idx, &(byte_pos, c)) in positions.iter().enumerate() {
        match c {
            '<' | '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(byte_pos + c.len_utf8());
                }
            }
            '>' => {
                let closes_multichar_copula = idx >= 2 && {
                    let prev_start = positions[idx - 2].0;
                    matches!(&line[prev_start..byte_pos], "=/" | "==" | "--")
                };
                if !closes_multichar_copula {
                    depth -= 1;
                    if depth == 0 {
                        return Some(byte_pos + c.len_utf8());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Pull `{f c}` truth out of the trailing tense/truth text, if present.
fn extract_truth(rest: &str) -> Option<Truth> {
    let start = rest.find('{')?;
    let end = rest[start..].find('}')? + start;
    let mut numbers = rest[start + 1..end].split_whitespace();
    let f: f64 = numbers.next()?.parse().ok()?;
    let c: f64 = numbers.next()?.parse().ok()?;
    Some(Truth::new(f, c))
}

fn process_directive(state: &mut NarState, directive: &str) -> ProtocolOutcome {
    if directive == "reset" {
        let config = state.config.clone();
        *state = NarState::init(config);
        return ProtocolOutcome::Reset;
    }
    if directive == "stats" {
        return ProtocolOutcome::Stats(state.stats());
    }
    if directive == "concepts" {
        return ProtocolOutcome::ConceptsDump(state.dump_concepts());
    }
    if let Some(rest) = directive.strip_prefix("setopname ") {
        return process_setopname(state, rest.trim());
    }

    let Some((key, value)) = directive.split_once('=') else {
        return ProtocolOutcome::Error(OnaError::Config {
            key: directive.to_string(),
            reason: "unrecognized directive".to_string(),
        });
    };

    if key == "motorbabbling" {
        return process_motorbabbling(state, value);
    }

    let config_key = match key {
        "currenttime" => "current_time",
        "stampid" => "stamp_id",
        other => other,
    };
    match state.config.set(config_key, value) {
        Ok(()) => ProtocolOutcome::ConfigUpdated,
        Err(e) => ProtocolOutcome::Error(e),
    }
}

fn process_motorbabbling(state: &mut NarState, value: &str) -> ProtocolOutcome {
    if let Ok(b) = value.parse::<bool>() {
        state.config.motor_babbling = b;
        return ProtocolOutcome::ConfigUpdated;
    }
    match value.parse::<f64>() {
        Ok(p) if (0.0..=1.0).contains(&p) => {
            state.config.motor_babbling = true;
            state.config.motor_babbling_chance = p;
            ProtocolOutcome::ConfigUpdated
        }
        _ => ProtocolOutcome::Error(OnaError::Config {
            key: "motorbabbling".to_string(),
            reason: "expected true/false or a probability in [0,1]".to_string(),
        }),
    }
}

fn process_setopname(state: &mut NarState, rest: &str) -> ProtocolOutcome {
    let mut parts = rest.split_whitespace();
    let (Some(id_str), Some(name)) = (parts.next(), parts.next()) else {
        return ProtocolOutcome::Error(OnaError::Config {
            key: "setopname".to_string(),
            reason: "expected 'ID NAME'".to_string(),
        });
    };
    let Ok(id) = id_str.parse::<u8>() else {
        return ProtocolOutcome::Error(OnaError::Config {
            key: "setopname".to_string(),
            reason: "ID must be an integer".to_string(),
        });
    };
    let name_term = Term::operation(name);
    if state.registry.rename(id, name_term.clone()) {
        ProtocolOutcome::OperationRenamed { id, name: name_term }
    } else {
        ProtocolOutcome::Error(OnaError::Config {
            key: "setopname".to_string(),
            reason: format!("no operation registered with id {id}"),
        })
    }
}
