//! Inverted atom index: atom string → set of concept keys whose term
//! mentions that atom (`spec.md` §3.6, §4.F).
//!
//! This is the cache that lets the cycle find "concepts related to
//! this event's term" in roughly constant time instead of scanning
//! every concept.

use crate::term::Term;
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct InvertedAtomIndex {
    by_atom: HashMap<Arc<str>, HashSet<Term>>,
}

impl InvertedAtomIndex {
    pub fn new() -> Self {
        InvertedAtomIndex::default()
    }

    /// Index `concept_key` under every atomic leaf atom of `term`
    /// (variables are ignored).
    pub fn add(&mut self, concept_key: &Term, term: &Term) {
        let mut atoms = Vec::new();
        term.atoms(&mut atoms);
        for atom in atoms {
            self.by_atom.entry(atom).or_default().insert(concept_key.clone());
        }
    }

    /// Remove `concept_key` from every atom-set it was indexed under
    /// for `term`, dropping now-empty atom buckets.
    pub fn remove(&mut self, concept_key: &Term, term: &Term) {
        let mut atoms = Vec::new();
        term.atoms(&mut atoms);
        for atom in atoms {
            if let Some(set) = self.by_atom.get_mut(&atom) {
                set.remove(concept_key);
                if set.is_empty() {
                    self.by_atom.remove(&atom);
                }
            }
        }
    }

    /// Concepts related to `term`: the union over `term`'s atoms of
    /// their indexed concept-key sets. Falls back to every concept key
    /// currently indexed if `term` mentions no atoms (e.g. a bare
    /// variable) or the index is empty.
    pub fn related_concepts(&self, term: &Term) -> HashSet<Term> {
        let mut atoms = Vec::new();
        term.atoms(&mut atoms);

        if atoms.is_empty() || self.by_atom.is_empty() {
            return self.all_keys();
        }

        let mut out = HashSet::new();
        for atom in atoms {
            if let Some(set) = self.by_atom.get(&atom) {
                out.extend(set.iter().cloned());
            }
        }
        out
    }

    fn all_keys(&self) -> HashSet<Term> {
        self.by_atom.values().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn add_then_related_concepts_finds_the_key() {
        let mut index = InvertedAtomIndex::new();
        let key = Term::atom("bird");
        let term = parser::parse("<bird --> flyer>").unwrap();
        index.add(&key, &term);

        let related = index.related_concepts(&Term::atom("flyer"));
        assert!(related.contains(&key));
    }

    #[test]
    fn remove_drops_the_key() {
        let mut index = InvertedAtomIndex::new();
        let key = Term::atom("bird");
        let term = parser::parse("<bird --> flyer>").unwrap();
        index.add(&key, &term);
        index.remove(&key, &term);

        let related = index.related_concepts(&Term::atom("flyer"));
        assert!(!related.contains(&key));
    }

    #[test]
    fn empty_index_falls_back_to_all_keys() {
        let index = InvertedAtomIndex::new();
        assert!(index.related_concepts(&Term::atom("anything")).is_empty());
    }

    #[test]
    fn variable_only_term_falls_back_to_all_keys() {
        let mut index = InvertedAtomIndex::new();
        let key = Term::atom("bird");
        index.add(&key, &parser::parse("<bird --> flyer>").unwrap());

        let query = crate::term::VarKind::Independent;
        let var_term = Term::variable(query, "x");
        let related = index.related_concepts(&var_term);
        assert!(related.contains(&key));
    }
}
