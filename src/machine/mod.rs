//! The machine interface consumed by transitions.
//!
//! A transition never owns its machine definition. It looks up its event and
//! endpoint states through [`Machine`], reads and writes the state attribute
//! through it, and walks the callback lists it exposes.
//!
//! [`StateMachine`] is the in-crate definition built with
//! [`MachineBuilder`](crate::builder::MachineBuilder); persistence
//! integrations can implement [`Machine`] directly instead.

mod config;
mod definition;

pub use config::MachineConfig;
pub use definition::{ActionFn, ReaderFn, StateMachine, TransactionFn, WriterFn};

use crate::callbacks::{Callback, CallbackError, Phase};
use crate::core::{EventDef, StateDef, StateValue};
use crate::transition::{LookupError, TransitionError};
use serde_json::Value;

/// Body run inside [`Machine::within_transaction`]. Returns whether the
/// transaction should commit.
pub type TransactionBody<'a, O> = dyn FnMut(&mut O) -> Result<bool, TransitionError> + 'a;

/// Outcome of a machine action (or of a caller-supplied action body).
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    pub result: Option<Value>,
    pub success: bool,
}

impl ActionOutcome {
    pub fn success(result: Option<Value>) -> Self {
        Self {
            result,
            success: true,
        }
    }

    pub fn failure(result: Option<Value>) -> Self {
        Self {
            result,
            success: false,
        }
    }
}

impl Default for ActionOutcome {
    fn default() -> Self {
        Self::success(None)
    }
}

/// State machine definition as seen by a transition.
pub trait Machine<O, V: StateValue> {
    /// Name of the state attribute this machine manages.
    fn attribute(&self) -> &str;

    fn fetch_event(&self, name: &str) -> Result<EventDef, LookupError>;

    fn fetch_state(&self, name: &str) -> Result<StateDef<V>, LookupError>;

    /// Read the current state value from the object.
    fn read(&self, object: &O) -> V;

    /// Write a state value into the object.
    fn write(&self, object: &mut O, value: V);

    /// Callbacks of one phase, in registration order.
    fn callbacks(&self, phase: Phase) -> &[Callback<O, V>];

    /// Whether `perform` should wrap the transition in
    /// [`within_transaction`](Machine::within_transaction) and defer after
    /// callbacks until the transaction has finished.
    fn use_transactions(&self) -> bool {
        false
    }

    /// Run `body` inside a transaction. Without transactional support the
    /// body is invoked directly.
    fn within_transaction(
        &self,
        object: &mut O,
        body: &mut TransactionBody<'_, O>,
    ) -> Result<bool, TransitionError> {
        body(object)
    }

    /// Run the machine's action (typically saving the object).
    fn run_action(&self, _object: &mut O, _args: &[Value]) -> Result<ActionOutcome, CallbackError> {
        Ok(ActionOutcome::default())
    }
}
