//! Context used to match callbacks against a transition.

use serde::{Deserialize, Serialize};

/// Immutable snapshot of `{event, from, to}` names for one transition.
///
/// Callback matchers are evaluated against this snapshot, and the same
/// snapshot is handed to every callback invocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionContext {
    pub event: String,
    pub from: String,
    pub to: String,
}

impl TransitionContext {
    pub fn new(event: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// True iff the transition starts and ends in the same state.
    pub fn is_loopback(&self) -> bool {
        self.from == self.to
    }
}
