//! Atomic terms: plain identifiers, optionally carrying the `^`
//! operation prefix (variables are handled by [`super::var`] instead).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An atomic term: an identifier string, possibly operation-prefixed.
///
/// Stored as an `Arc<str>` rather than a `SmartString` so that the
/// same atom can be cheaply shared between a term, the inverted atom
/// index, and operation registry keys without re-allocating.
#[derive(Debug, Clone)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Create a new atom from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Atom(name.into())
    }

    /// The atom's textual name, including any `^` prefix.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// A clone of the underlying `Arc<str>`, for index keys.
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_preserves_operation_prefix() {
        let a = Atom::new("^left");
        assert_eq!(a.name(), "^left");
        assert_eq!(format!("{a}"), "^left");
    }

    #[test]
    fn atoms_with_equal_names_are_equal() {
        assert_eq!(Atom::new("red"), Atom::new("red"));
        assert_ne!(Atom::new("red"), Atom::new("blue"));
    }
}
