//! Read-only views of a transition.

use crate::core::{EventDef, TransitionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a callback sees of the transition it runs for.
#[derive(Debug)]
pub struct TransitionView<'t, V> {
    pub context: &'t TransitionContext,
    pub attribute: &'t str,
    pub event: &'t EventDef,
    /// Value the attribute held when the transition was created.
    pub from: &'t V,
    /// Value written by `persist`.
    pub to: &'t V,
    pub args: &'t [Value],
    pub result: Option<&'t Value>,
    pub success: bool,
}

impl<V> TransitionView<'_, V> {
    pub fn event_name(&self) -> &str {
        &self.context.event
    }

    pub fn from_name(&self) -> &str {
        &self.context.from
    }

    pub fn to_name(&self) -> &str {
        &self.context.to
    }

    pub fn is_loopback(&self) -> bool {
        self.context.is_loopback()
    }
}

/// Attribute snapshot of a transition, for introspection and logging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionAttributes<V> {
    pub attribute: String,
    pub event: String,
    pub from: V,
    pub from_name: String,
    pub to: V,
    pub to_name: String,
}
