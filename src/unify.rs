//! Variable unification and substitution (`spec.md` §4.E).
//!
//! Independent (`$`), dependent (`#`), and query (`?`) variables all
//! unify by the same consistency rule here: the first occurrence of a
//! variable binds it, every later occurrence of *that exact variable*
//! (same kind and name) must unify with an identical term. The
//! difference between `$` and `#` only matters to the optional
//! variable-introduction pass below, not to unification itself.

use crate::term::{Copula, Term, VarKind};
use hashbrown::HashMap;
use std::sync::Arc;

/// A variable identity: kind plus name, since `$x` and `#x` are
/// distinct variables even when they share a name.
type VarKey = (VarKind, Arc<str>);

/// The bindings produced by a successful unification.
pub type Bindings = HashMap<VarKey, Term>;

/// Attempt to unify `pattern` (which may contain variables) against
/// `concrete`. Returns the bindings on success.
pub fn unify(pattern: &Term, concrete: &Term) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    if unify_into(pattern, concrete, &mut bindings) {
        Some(bindings)
    } else {
        None
    }
}

fn unify_into(pattern: &Term, concrete: &Term, bindings: &mut Bindings) -> bool {
    match pattern {
        Term::Variable(kind, name) => {
            let key = (*kind, Arc::clone(name));
            match bindings.get(&key) {
                Some(bound) => bound == concrete,
                None => {
                    bindings.insert(key, concrete.clone());
                    true
                }
            }
        }
        Term::Atomic(_) => pattern == concrete,
        Term::Compound(pc) => match concrete {
            Term::Compound(cc) if pc.copula() == cc.copula() => {
                unify_into(pc.left(), cc.left(), bindings)
                    && unify_into(pc.right(), cc.right(), bindings)
            }
            _ => false,
        },
    }
}

/// Replace every variable leaf in `term` with its bound term, leaving
/// unbound variables and non-variable structure untouched.
pub fn substitute(term: &Term, bindings: &Bindings) -> Term {
    match term {
        Term::Variable(kind, name) => bindings
            .get(&(*kind, Arc::clone(name)))
            .cloned()
            .unwrap_or_else(|| term.clone()),
        Term::Atomic(_) => term.clone(),
        Term::Compound(c) => Term::compound(
            c.copula(),
            substitute(c.left(), bindings),
            substitute(c.right(), bindings),
        ),
    }
}

/// True if `term` contains any variable leaf.
pub fn has_variable(term: &Term) -> bool {
    match term {
        Term::Variable(_, _) => true,
        Term::Atomic(_) => false,
        Term::Compound(c) => has_variable(c.left()) || has_variable(c.right()),
    }
}

/// Optional generalization pass (`spec.md` §4.E, §9 open question 4):
/// scan an implication `<L =/> R>`, turn atoms occurring on both sides
/// into a shared fresh `$n`, and atoms occurring twice or more on only
/// one side into a shared `#n`. Operation atoms are never renamed, so
/// the operation-index of the resulting implication matches the
/// original. Not invoked automatically anywhere in the cycle; a host
/// may call it to generalize a taught implication before storing it.
pub fn introduce_variables(term: &Term) -> Term {
    let Term::Compound(c) = term else {
        return term.clone();
    };
    if !matches!(c.copula(), Copula::Implication | Copula::TemporalImplication) {
        return term.clone();
    }

    let mut left_atoms = Vec::new();
    c.left().atoms(&mut left_atoms);
    let mut right_atoms = Vec::new();
    c.right().atoms(&mut right_atoms);

    let mut left_counts: HashMap<Arc<str>, usize> = HashMap::new();
    for a in &left_atoms {
        *left_counts.entry(Arc::clone(a)).or_insert(0) += 1;
    }
    let mut right_counts: HashMap<Arc<str>, usize> = HashMap::new();
    for a in &right_atoms {
        *right_counts.entry(Arc::clone(a)).or_insert(0) += 1;
    }

    let mut renames: HashMap<Arc<str>, Term> = HashMap::new();
    let mut next_id = 0usize;
    for (atom, &left_count) in &left_counts {
        if atom.starts_with('^') {
            continue;
        }
        let right_count = right_counts.get(atom).copied().unwrap_or(0);
        if right_count > 0 {
            renames.insert(
                Arc::clone(atom),
                Term::variable(VarKind::Independent, format!("v{next_id}")),
            );
            next_id += 1;
        } else if left_count >= 2 {
            renames.insert(
                Arc::clone(atom),
                Term::variable(VarKind::Dependent, format!("v{next_id}")),
            );
            next_id += 1;
        }
    }
    for (atom, &right_count) in &right_counts {
        if atom.starts_with('^') || renames.contains_key(atom) {
            continue;
        }
        if right_count >= 2 {
            renames.insert(
                Arc::clone(atom),
                Term::variable(VarKind::Dependent, format!("v{next_id}")),
            );
            next_id += 1;
        }
    }

    Term::compound(
        c.copula(),
        rename_atoms(c.left(), &renames),
        rename_atoms(c.right(), &renames),
    )
}

fn rename_atoms(term: &Term, renames: &HashMap<Arc<str>, Term>) -> Term {
    match term {
        Term::Atomic(a) => renames.get(a.name()).cloned().unwrap_or_else(|| term.clone()),
        Term::Variable(_, _) => term.clone(),
        Term::Compound(c) => Term::compound(
            c.copula(),
            rename_atoms(c.left(), renames),
            rename_atoms(c.right(), renames),
        ),
    }
}
