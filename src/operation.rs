//! Operation registry: the at-most-ten motor operations the decision
//! maker can select and execute (`spec.md` §3.7, §4.I).
//!
//! Operation callbacks are the user-supplied effectors `spec.md` §1
//! scopes out of the core — this module only holds them and reports
//! how execution went; it never decides what an operation *does*.

use crate::error::OnaError;
use crate::term::Term;

pub const OPERATIONS_MAX: u8 = 10;

/// A registered operation callback. Takes the arguments the decision
/// maker passed and reports success or a fault message; faults are
/// captured by [`OperationRegistry::execute`] rather than propagated.
pub type OperationCallback = Box<dyn FnMut(&[Term]) -> Result<Term, String> + Send>;

pub struct Operation {
    pub id: u8,
    pub name: Term,
    callback: OperationCallback,
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The outcome of invoking a registered operation's callback.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub executed_term: Term,
    pub result: Result<Term, String>,
}

#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: Vec<Operation>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        OperationRegistry::default()
    }

    /// Register a new operation, assigning the next free ID in
    /// registration order. Fails once 10 operations are registered.
    pub fn register(&mut self, name: Term, callback: OperationCallback) -> Result<u8, OnaError> {
        if self.operations.len() as u8 >= OPERATIONS_MAX {
            return Err(OnaError::RegistryFull);
        }
        let id = self.operations.len() as u8 + 1;
        self.operations.push(Operation { id, name, callback });
        Ok(id)
    }

    /// Look up a registered operation by its term.
    pub fn get_by_term(&self, term: &Term) -> Option<&Operation> {
        self.operations.iter().find(|op| &op.name == term)
    }

    /// The operation-index used by concept implication tables: the
    /// operation's ID, or 0 if `term` is not a registered operation.
    pub fn index_of(&self, term: &Term) -> u8 {
        self.get_by_term(term).map_or(0, |op| op.id)
    }

    pub fn get(&self, id: u8) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }

    /// Rebind the name of an already-registered operation: the
    /// `*setopname ID NAME` textual protocol directive (`spec.md` §6).
    /// Returns `false` if `id` isn't registered.
    pub fn rename(&mut self, id: u8, name: Term) -> bool {
        match self.operations.iter_mut().find(|op| op.id == id) {
            Some(op) => {
                op.name = name;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.operations.iter().map(|op| op.id)
    }

    /// Invoke the callback for `id`, capturing any reported fault
    /// (`spec.md` §7 `OperationCallbackFault`). The cycle continues
    /// regardless of outcome.
    pub fn execute(&mut self, id: u8, args: &[Term]) -> Option<ExecutionOutcome> {
        let op = self.operations.iter_mut().find(|op| op.id == id)?;
        let executed_term = op.name.clone();
        let result = (op.callback)(args);
        let success = result.is_ok();
        Some(ExecutionOutcome {
            success,
            executed_term,
            result,
        })
    }
}
