//! Transition error types.

use crate::callbacks::Phase;
use thiserror::Error;

/// A name could not be resolved against the machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Event '{0}' is not defined")]
    UnknownEvent(String),

    #[error("State '{0}' is not defined")]
    UnknownState(String),
}

/// Errors that can occur while running a transition.
///
/// Halts are not errors: they are absorbed at phase boundaries and reported
/// as a `false` outcome.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Callback '{callback}' failed during {phase} phase: {message}")]
    CallbackFault {
        callback: String,
        phase: Phase,
        message: String,
    },

    #[error("Transition action failed: {message}")]
    ActionFault { message: String },

    #[error("Transition is paused; call after() to resume it first")]
    AlreadyPaused,
}
