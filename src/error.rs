//! Error taxonomy (`spec.md` §7).
//!
//! Most of the conditions `spec.md` names are not represented here at
//! all: `OperationCallbackFault`, `StampOverlap`, and `QueueOverflow`
//! are internal, logged-and-continue outcomes, never propagated as
//! `Err`. Only the handful that must surface to a caller get a variant.
//! An internally-raised invariant violation (a malformed compound, a
//! concept with no implication tables) is a bug, not a recoverable
//! error, and panics with context instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OnaError {
    #[error("malformed term string")]
    Parse(#[from] crate::parser::ParseError),

    #[error("operation registry is full (max {max} operations)", max = crate::operation::OPERATIONS_MAX)]
    RegistryFull,

    #[error("config error for key '{key}': {reason}")]
    Config { key: String, reason: String },
}
