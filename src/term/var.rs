//! Variable kinds: independent (`$`), dependent (`#`), and query (`?`).

use std::fmt;

/// The three variable prefixes recognized by the term algebra
/// (`spec.md` §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `$x` — unifies with any term; consistent across one problem.
    Independent,
    /// `#x` — unifies only to the same bound term within one problem.
    Dependent,
    /// `?x` — used only in queries; treated like `$x` for unification.
    Query,
}

impl VarKind {
    /// The prefix character for this variable kind.
    pub fn prefix(self) -> char {
        match self {
            VarKind::Independent => '$',
            VarKind::Dependent => '#',
            VarKind::Query => '?',
        }
    }

    /// Recognize a prefix character, if any.
    pub fn from_prefix(c: char) -> Option<VarKind> {
        match c {
            '$' => Some(VarKind::Independent),
            '#' => Some(VarKind::Dependent),
            '?' => Some(VarKind::Query),
            _ => None,
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
