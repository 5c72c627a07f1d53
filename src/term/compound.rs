//! Compound terms: a copula applied to exactly two subterms.

use super::{Copula, Term};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A compound term. Children are `Arc`-shared so that forming sequences
/// and implications during mining (`spec.md` §4.J) doesn't repeatedly
/// deep-clone shared substructure.
#[derive(Debug, Clone)]
pub struct Compound {
    copula: Copula,
    left: Arc<Term>,
    right: Arc<Term>,
}

impl Compound {
    /// Build a new compound from a copula and two subterms.
    pub fn new(copula: Copula, left: Term, right: Term) -> Self {
        Compound {
            copula,
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }

    pub fn copula(&self) -> Copula {
        self.copula
    }

    pub fn left(&self) -> &Term {
        &self.left
    }

    pub fn right(&self) -> &Term {
        &self.right
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Inheritance and implication terms use the `<...>` bracket in
        // Narsese convention; plain conjunctions/sequences use `(...)`.
        match self.copula {
            Copula::Inheritance | Copula::Implication | Copula::TemporalImplication => {
                write!(f, "<{} {} {}>", self.left, self.copula, self.right)
            }
            Copula::Sequence | Copula::Conjunction | Copula::Disjunction => {
                write!(f, "({} {} {})", self.left, self.copula, self.right)
            }
        }
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.copula == other.copula && self.left == other.left && self.right == other.right
    }
}

impl Eq for Compound {}

impl Hash for Compound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.copula.hash(state);
        self.left.hash(state);
        self.right.hash(state);
    }
}
