//! Errors reported by the event subsystem

use thiserror::Error;

/// Structural errors surfaced by registry accessors and dispatch operations.
///
/// Failures of user-supplied change actions are not errors at this level;
/// they accumulate in
/// [`EventChangeResult`](crate::events::EventChangeResult) and the caller
/// decides how to proceed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// An uninitialized (sentinel) id was passed to an accessor.
    #[error("{method}: uninitialized (invalid) {id_kind}")]
    InvalidArgument {
        method: &'static str,
        id_kind: &'static str,
    },

    /// An id was out of range for the container it indexes.
    #[error("{method}: index {index} out of range ({count} entries)")]
    InvalidIndex {
        method: &'static str,
        index: usize,
        count: usize,
    },

    /// An in-range slot holds no object.
    #[error("{method}: no object associated with index {index}")]
    Missing { method: &'static str, index: usize },

    /// An operation was called in a state its contract forbids.
    #[error("{method}: {message}")]
    PreconditionViolated {
        method: &'static str,
        message: &'static str,
    },

    /// An internal consistency check failed. Diagnostic only; should be
    /// impossible to reach through the public interface.
    #[error("{method}: {message}")]
    InvariantBroken { method: &'static str, message: String },
}
