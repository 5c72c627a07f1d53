//! Term parsing: the bracket-depth-aware copula scanner from
//! `spec.md` §4.A.
//!
//! The textual I/O shell (reading Narsese from a stream, printing
//! answers) is an external collaborator per `spec.md` §1 — this module
//! only turns a term string into a [`Term`] and back. It never reads
//! from or writes to the outside world.

use crate::term::{Copula, Term, VarKind};
use thiserror::Error;

/// Parse failures. Per `spec.md` §4.A the parser otherwise "fails
/// gracefully" by treating unrecognized content as an atomic term, so
/// this enum only covers the one case that can't be recovered from: no
/// text at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty term string")]
    Empty,
}

/// Copula tokens tried at each depth-0 scan position, in the priority
/// order `spec.md` §4.A specifies for the four temporal/structural
/// copulas, extended with the two non-temporal logical copulas so that
/// every `Copula` the term algebra can produce also round-trips
/// through the parser.
const SCAN_TOKENS: [(&str, Copula); 6] = [
    ("=/>", Copula::TemporalImplication),
    ("==>", Copula::Implication),
    ("&/", Copula::Sequence),
    ("-->", Copula::Inheritance),
    ("&", Copula::Conjunction),
    ("|", Copula::Disjunction),
];

/// Parse a term string into a [`Term`].
pub fn parse(input: &str) -> Result<Term, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(parse_term(trimmed))
}

/// Canonical serialization of a term; `parse(format(t)) == t` for
/// every term this module can produce.
pub fn format(term: &Term) -> String {
    term.format()
}

fn parse_term(s: &str) -> Term {
    let s = s.trim();
    if s.is_empty() {
        return Term::atom("");
    }

    let bracketed = (s.starts_with('<') && s.ends_with('>') && s.len() >= 2)
        || (s.starts_with('(') && s.ends_with(')') && s.len() >= 2);

    if !bracketed {
        return parse_atomic(s);
    }

    let inner = &s[1..s.len() - 1];
    match find_top_level_copula(inner) {
        Some((copula, pos, len)) => {
            let left = parse_term(&inner[..pos]);
            let right = parse_term(&inner[pos + len..]);
            Term::compound(copula, left, right)
        }
        // Fail gracefully: unrecognized bracketed content becomes an
        // atomic term carrying the original string, per `spec.md` §4.A.
        None => Term::atom(s),
    }
}

fn parse_atomic(s: &str) -> Term {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if VarKind::from_prefix(c).is_some() => {
            let kind = VarKind::from_prefix(c).unwrap();
            Term::variable(kind, chars.as_str())
        }
        _ => Term::atom(s),
    }
}

/// Scan `s` left to right tracking bracket depth; return the first
/// depth-0 copula match in priority order, as `(copula, byte offset,
/// token byte length)`.
fn find_top_level_copula(s: &str) -> Option<(Copula, usize, usize)> {
    let positions: Vec<(usize, char)> = s.char_indices().collect();
    let mut depth: i32 = 0;

    for (idx, &(byte_pos, c)) in positions.iter().enumerate() {
        if depth == 0 {
            if let Some((copula, len)) = match_copula_at(s, byte_pos) {
                return Some((copula, byte_pos, len));
            }
        }
        match c {
            '<' | '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '>' => {
                let closes_multichar_copula = idx >= 2 && {
                    let prev_start = positions[idx - 2].0;
                    matches!(&s[prev_start..byte_pos], "=/" | "==" | "--")
                };
                if !closes_multichar_copula {
                    depth -= 1;
                }
            }
            _ => {}
        }
    }
    None
}

fn match_copula_at(s: &str, pos: usize) -> Option<(Copula, usize)> {
    let rest = &s[pos..];
    SCAN_TOKENS
        .iter()
        .find(|(tok, _)| rest.starts_with(tok))
        .map(|(tok, copula)| (*copula, tok.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Copula;

    #[test]
    fn parses_plain_atom() {
        assert_eq!(parse("red").unwrap(), Term::atom("red"));
    }

    #[test]
    fn parses_operation() {
        let t = parse("^left").unwrap();
        assert!(t.is_operation());
    }

    #[test]
    fn parses_variables() {
        assert_eq!(
            parse("$x").unwrap(),
            Term::variable(VarKind::Independent, "x")
        );
        assert_eq!(parse("#y").unwrap(), Term::variable(VarKind::Dependent, "y"));
        assert_eq!(parse("?z").unwrap(), Term::variable(VarKind::Query, "z"));
    }

    #[test]
    fn parses_inheritance() {
        let t = parse("<bird --> flyer>").unwrap();
        match &t {
            Term::Compound(c) => {
                assert_eq!(c.copula(), Copula::Inheritance);
                assert_eq!(c.left(), &Term::atom("bird"));
                assert_eq!(c.right(), &Term::atom("flyer"));
            }
            _ => panic!("expected compound"),
        }
    }

    #[test]
    fn parses_temporal_implication_with_nested_sequence() {
        // S6 from spec.md §8: must parse as a temporal implication whose
        // subject is a sequence ending in an operation, not a flat
        // sequence of three inheritance atoms.
        let t = parse("<(<a --> b> &/ ^left) =/> <c --> d>>").unwrap();
        let Term::Compound(top) = &t else {
            panic!("expected compound");
        };
        assert_eq!(top.copula(), Copula::TemporalImplication);
        let Term::Compound(subject) = top.left() else {
            panic!("expected sequence subject");
        };
        assert_eq!(subject.copula(), Copula::Sequence);
        assert!(subject.right().is_operation());
        assert_eq!(subject.left(), &parse("<a --> b>").unwrap());
        assert_eq!(top.right(), &parse("<c --> d>").unwrap());
    }

    #[test]
    fn format_round_trips() {
        let cases = [
            "red",
            "^left",
            "$x",
            "<bird --> flyer>",
            "<red =/> ^left>",
            "(a &/ b)",
            "<(a &/ ^left) =/> goal>",
        ];
        for case in cases {
            let t = parse(case).unwrap();
            let reparsed = parse(&format(&t)).unwrap();
            assert_eq!(t, reparsed, "round trip failed for {case}");
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(parse("   ").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn unrecognized_bracketed_content_becomes_atomic() {
        // No recognized copula inside the brackets -> graceful atomic
        // fallback carrying the original string.
        let t = parse("<just some words>").unwrap();
        assert!(t.is_atomic());
    }
}
