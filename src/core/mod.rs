//! Core value types shared by machines, callbacks and transitions.
//!
//! This module contains the pure pieces of the engine:
//! - State and event definitions (`StateDef`, `EventDef`)
//! - The `(event, from, to)` snapshot used for callback matching
//! - Guard predicates over the transitioned object
//!
//! Nothing in this module touches an object's attribute.

mod context;
mod guard;
mod state;

pub use context::TransitionContext;
pub use guard::Guard;
pub use state::{EventDef, StateDef, StateValue};
