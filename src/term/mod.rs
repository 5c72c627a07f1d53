//! Term representation for the reasoner's term algebra.
//!
//! A term is either atomic (an identifier, optionally a variable or an
//! operation) or compound (a binary copula applied to two subterms).
//! Terms are immutable once built and compare by structural equality.

pub mod atom;
pub mod compound;
pub mod var;

pub use atom::Atom;
pub use compound::Compound;
pub use var::VarKind;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The binary relations a compound term can carry, per `spec.md` §3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Copula {
    /// `-->` inheritance: `<S --> P>`.
    Inheritance,
    /// `==>` implication.
    Implication,
    /// `=/>` temporal implication.
    TemporalImplication,
    /// `&/` temporal sequence.
    Sequence,
    /// `&` conjunction (received but not used by the core).
    Conjunction,
    /// `|` disjunction (received but not used by the core).
    Disjunction,
}

impl Copula {
    /// The canonical infix string for this copula, used by both the
    /// parser and the formatter so that `parse(format(t)) == t`.
    pub fn as_str(self) -> &'static str {
        match self {
            Copula::Inheritance => "-->",
            Copula::Implication => "==>",
            Copula::TemporalImplication => "=/>",
            Copula::Sequence => "&/",
            Copula::Conjunction => "&",
            Copula::Disjunction => "|",
        }
    }

    /// Copulas in the priority order the parser tries them when
    /// scanning for the top-level main copula (`spec.md` §4.A).
    pub const SCAN_PRIORITY: [Copula; 4] = [
        Copula::TemporalImplication,
        Copula::Implication,
        Copula::Sequence,
        Copula::Inheritance,
    ];
}

impl fmt::Display for Copula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A term: atomic, compound, or a bare variable.
///
/// Variables are kept as their own variant (rather than folded into
/// `Atomic`) because unification and substitution need to distinguish
/// them cheaply and often; `is_atomic` still reports `true` for them,
/// matching `spec.md`'s definition of an atomic term as "an identifier
/// string; optionally a variable... optionally an operation".
#[derive(Debug, Clone)]
pub enum Term {
    Atomic(Atom),
    Variable(VarKind, Arc<str>),
    Compound(Compound),
}

impl Term {
    /// Build a plain atomic term (no variable/operation prefix).
    pub fn atom(name: impl Into<Arc<str>>) -> Term {
        Term::Atomic(Atom::new(name))
    }

    /// Build an operation term (`^name`).
    pub fn operation(name: impl AsRef<str>) -> Term {
        let name = name.as_ref();
        let bare = name.strip_prefix('^').unwrap_or(name);
        Term::Atomic(Atom::new(format!("^{bare}")))
    }

    /// Build a variable term of the given kind.
    pub fn variable(kind: VarKind, name: impl Into<Arc<str>>) -> Term {
        Term::Variable(kind, name.into())
    }

    /// Build a compound term from a copula and two subterms.
    pub fn compound(copula: Copula, left: Term, right: Term) -> Term {
        Term::Compound(Compound::new(copula, left, right))
    }

    /// True for atomic terms and bare variables; false for compounds.
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Term::Compound(_))
    }

    /// True for `Term::Compound`.
    pub fn is_compound(&self) -> bool {
        matches!(self, Term::Compound(_))
    }

    /// True for any variable term (independent, dependent, or query).
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_, _))
    }

    /// The operation-term test from `spec.md` §4.A: atomic and starts
    /// with `^`.
    pub fn is_operation(&self) -> bool {
        match self {
            Term::Atomic(a) => a.name().starts_with('^'),
            _ => false,
        }
    }

    /// True for a sequence compound (`&/`).
    pub fn is_sequence(&self) -> bool {
        matches!(self, Term::Compound(c) if c.copula() == Copula::Sequence)
    }

    /// True for a temporal- or non-temporal implication compound.
    pub fn is_implication(&self) -> bool {
        matches!(
            self,
            Term::Compound(c)
                if c.copula() == Copula::Implication || c.copula() == Copula::TemporalImplication
        )
    }

    /// The subject of a compound term (its left subterm).
    pub fn get_subject(&self) -> Option<&Term> {
        match self {
            Term::Compound(c) => Some(c.left()),
            _ => None,
        }
    }

    /// The predicate of a compound term (its right subterm).
    pub fn get_predicate(&self) -> Option<&Term> {
        match self {
            Term::Compound(c) => Some(c.right()),
            _ => None,
        }
    }

    /// Sequence length: 1 for non-sequences, else the sum of the
    /// lengths of the children (sequences are right-nested binary
    /// trees), per `spec.md` §3.1.
    pub fn sequence_length(&self) -> usize {
        match self {
            Term::Compound(c) if c.copula() == Copula::Sequence => {
                c.left().sequence_length() + c.right().sequence_length()
            }
            _ => 1,
        }
    }

    /// The rightmost leaf of a sequence, traversing right; this is the
    /// position where operations are expected (`spec.md` §3.1).
    pub fn rightmost_leaf(&self) -> &Term {
        match self {
            Term::Compound(c) if c.copula() == Copula::Sequence => c.right().rightmost_leaf(),
            _ => self,
        }
    }

    /// If this term is a sequence whose rightmost leaf is an operation,
    /// returns `(operation, remainder)` where `remainder` is the
    /// sequence with that trailing operation removed (or the atomic
    /// context term, if only one element remained). Returns `(None,
    /// self)` otherwise. Implements `extract_rightmost_operation`
    /// (`spec.md` §4.A).
    pub fn extract_rightmost_operation(&self) -> (Option<Term>, Term) {
        match self {
            Term::Compound(c) if c.copula() == Copula::Sequence => {
                if c.right().is_operation() {
                    (Some(c.right().clone()), c.left().clone())
                } else {
                    let (op, remainder) = c.right().extract_rightmost_operation();
                    match op {
                        Some(op) => (
                            Some(op),
                            Term::compound(Copula::Sequence, c.left().clone(), remainder),
                        ),
                        None => (None, self.clone()),
                    }
                }
            }
            _ => (None, self.clone()),
        }
    }

    /// Peel trailing operations off a precondition sequence until the
    /// rightmost leaf is no longer an operation (`spec.md` §4.A).
    pub fn strip_operations_from_precondition(&self) -> Term {
        match self {
            Term::Compound(c) if c.copula() == Copula::Sequence && c.right().is_operation() => {
                c.left().strip_operations_from_precondition()
            }
            _ => self.clone(),
        }
    }

    /// Flatten a `&/`-joined context term into its atomic components,
    /// left-to-right, depth-first (used by the decision maker's
    /// context check, `spec.md` §4.K).
    pub fn flatten_sequence(&self) -> Vec<&Term> {
        match self {
            Term::Compound(c) if c.copula() == Copula::Sequence => {
                let mut left = c.left().flatten_sequence();
                left.extend(c.right().flatten_sequence());
                left
            }
            _ => vec![self],
        }
    }

    /// Collect every atomic (non-variable) leaf atom string mentioned
    /// by this term, used to populate/query the inverted atom index.
    pub fn atoms(&self, out: &mut Vec<Arc<str>>) {
        match self {
            Term::Atomic(a) => out.push(a.name_arc()),
            Term::Variable(_, _) => {}
            Term::Compound(c) => {
                c.left().atoms(out);
                c.right().atoms(out);
            }
        }
    }

    /// Canonical serialization. Guaranteed to re-parse to an equal
    /// term (`spec.md` §3.1).
    pub fn format(&self) -> String {
        format!("{self}")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atomic(a) => write!(f, "{a}"),
            Term::Variable(kind, name) => write!(f, "{}{}", kind.prefix(), name),
            Term::Compound(c) => write!(f, "{c}"),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Atomic(a), Term::Atomic(b)) => a == b,
            (Term::Variable(k1, n1), Term::Variable(k2, n2)) => k1 == k2 && n1 == n2,
            (Term::Compound(a), Term::Compound(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Term::Atomic(a) => {
                0u8.hash(state);
                a.hash(state);
            }
            Term::Variable(kind, name) => {
                1u8.hash(state);
                kind.hash(state);
                name.hash(state);
            }
            Term::Compound(c) => {
                2u8.hash(state);
                c.hash(state);
            }
        }
    }
}
