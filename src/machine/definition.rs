//! In-crate machine definition.

use crate::builder::MachineBuilder;
use crate::callbacks::{Callback, CallbackError, Phase};
use crate::core::{EventDef, StateDef, StateValue};
use crate::machine::{ActionOutcome, Machine, MachineConfig, TransactionBody};
use crate::transition::{LookupError, TransitionError};
use serde_json::Value;
use std::sync::Arc;

/// Type alias for attribute readers.
pub type ReaderFn<O, V> = Arc<dyn Fn(&O) -> V + Send + Sync>;

/// Type alias for attribute writers.
pub type WriterFn<O, V> = Arc<dyn Fn(&mut O, V) + Send + Sync>;

/// Type alias for machine actions.
pub type ActionFn<O> =
    Arc<dyn Fn(&mut O, &[Value]) -> Result<ActionOutcome, CallbackError> + Send + Sync>;

/// Type alias for transaction hooks.
pub type TransactionFn<O> = Arc<
    dyn Fn(&mut O, &mut TransactionBody<'_, O>) -> Result<bool, TransitionError> + Send + Sync,
>;

/// A state machine definition: states, events, callbacks and the
/// attribute accessors for one state attribute.
pub struct StateMachine<O, V> {
    pub(crate) config: MachineConfig,
    pub(crate) states: Vec<StateDef<V>>,
    pub(crate) events: Vec<EventDef>,
    pub(crate) reader: ReaderFn<O, V>,
    pub(crate) writer: WriterFn<O, V>,
    pub(crate) before_callbacks: Vec<Callback<O, V>>,
    pub(crate) after_callbacks: Vec<Callback<O, V>>,
    pub(crate) action: Option<ActionFn<O>>,
    pub(crate) transaction: Option<TransactionFn<O>>,
}

impl<O, V: StateValue> StateMachine<O, V> {
    /// Create a builder for a machine.
    pub fn builder() -> MachineBuilder<O, V> {
        MachineBuilder::new()
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn states(&self) -> &[StateDef<V>] {
        &self.states
    }

    pub fn events(&self) -> &[EventDef] {
        &self.events
    }
}

impl<O, V: StateValue> Machine<O, V> for StateMachine<O, V> {
    fn attribute(&self) -> &str {
        &self.config.attribute
    }

    fn fetch_event(&self, name: &str) -> Result<EventDef, LookupError> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| LookupError::UnknownEvent(name.to_string()))
    }

    fn fetch_state(&self, name: &str) -> Result<StateDef<V>, LookupError> {
        self.states
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| LookupError::UnknownState(name.to_string()))
    }

    fn read(&self, object: &O) -> V {
        (self.reader)(object)
    }

    fn write(&self, object: &mut O, value: V) {
        (self.writer)(object, value)
    }

    fn callbacks(&self, phase: Phase) -> &[Callback<O, V>] {
        match phase {
            Phase::Before => &self.before_callbacks,
            Phase::After => &self.after_callbacks,
        }
    }

    fn use_transactions(&self) -> bool {
        self.config.use_transactions && self.transaction.is_some()
    }

    fn within_transaction(
        &self,
        object: &mut O,
        body: &mut TransactionBody<'_, O>,
    ) -> Result<bool, TransitionError> {
        match &self.transaction {
            Some(hook) if self.config.use_transactions => hook(object, body),
            _ => body(object),
        }
    }

    fn run_action(&self, object: &mut O, args: &[Value]) -> Result<ActionOutcome, CallbackError> {
        match &self.action {
            Some(action) => action(object, args),
            None => Ok(ActionOutcome::default()),
        }
    }
}
