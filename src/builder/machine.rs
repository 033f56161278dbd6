//! Builder for constructing state machine definitions.

use crate::builder::callback::CallbackBuilder;
use crate::builder::error::{BuildError, DefinitionError};
use crate::callbacks::{Callback, CallbackError, Phase};
use crate::core::{EventDef, StateDef, StateValue};
use crate::machine::{
    ActionFn, ActionOutcome, MachineConfig, ReaderFn, StateMachine, TransactionBody,
    TransactionFn, WriterFn,
};
use crate::transition::TransitionError;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionError>>;

/// Builder for constructing state machines with a fluent API.
pub struct MachineBuilder<O, V> {
    config: MachineConfig,
    states: Vec<StateDef<V>>,
    events: Vec<EventDef>,
    reader: Option<ReaderFn<O, V>>,
    writer: Option<WriterFn<O, V>>,
    callbacks: Vec<Callback<O, V>>,
    action: Option<ActionFn<O>>,
    transaction: Option<TransactionFn<O>>,
}

impl<O, V: StateValue> MachineBuilder<O, V> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
            states: Vec::new(),
            events: Vec::new(),
            reader: None,
            writer: None,
            callbacks: Vec::new(),
            action: None,
            transaction: None,
        }
    }

    /// Replace the machine configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the name of the state attribute.
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.config.attribute = attribute.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = Some(namespace.into());
        self
    }

    pub fn use_transactions(mut self, enabled: bool) -> Self {
        self.config.use_transactions = enabled;
        self
    }

    /// Add a state with the value stored in the attribute.
    pub fn state(mut self, name: impl Into<String>, value: V) -> Self {
        self.states.push(StateDef::new(name, value));
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.push(EventDef::new(name));
        self
    }

    /// Set the attribute reader (required).
    pub fn reader<F>(mut self, reader: F) -> Self
    where
        F: Fn(&O) -> V + Send + Sync + 'static,
    {
        self.reader = Some(Arc::new(reader));
        self
    }

    /// Set the attribute writer (required).
    pub fn writer<F>(mut self, writer: F) -> Self
    where
        F: Fn(&mut O, V) + Send + Sync + 'static,
    {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Set the action run by `perform` after the state is persisted.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut O, &[Value]) -> Result<ActionOutcome, CallbackError> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Install a transaction hook. The hook must invoke the body once and
    /// commit only if it returns `Ok(true)`.
    pub fn within_transaction<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut O, &mut TransactionBody<'_, O>) -> Result<bool, TransitionError>
            + Send
            + Sync
            + 'static,
    {
        self.transaction = Some(Arc::new(hook));
        self
    }

    /// Add a callback using a builder.
    /// Returns an error if the builder fails validation.
    pub fn callback(mut self, builder: CallbackBuilder<O, V>) -> Result<Self, BuildError> {
        let callback = builder.build()?;
        self.callbacks.push(callback);
        Ok(self)
    }

    /// Add a pre-built callback.
    pub fn add_callback(mut self, callback: Callback<O, V>) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Build the machine.
    /// Returns an error if required fields are missing or the definition is
    /// inconsistent. All definition problems are reported at once.
    pub fn build(self) -> Result<StateMachine<O, V>, BuildError> {
        let reader = self.reader.ok_or(BuildError::MissingReader)?;
        let writer = self.writer.ok_or(BuildError::MissingWriter)?;

        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        if let Validation::Failure(errors) =
            validate_definition(&self.states, &self.events, &self.callbacks)
        {
            return Err(BuildError::InvalidDefinition(
                errors.iter().cloned().collect(),
            ));
        }

        let namespace = self.config.namespace.as_deref();
        let states = self
            .states
            .into_iter()
            .map(|s| s.with_namespace(namespace))
            .collect();
        let events = self
            .events
            .into_iter()
            .map(|e| e.with_namespace(namespace))
            .collect();

        let (before_callbacks, after_callbacks): (Vec<_>, Vec<_>) = self
            .callbacks
            .into_iter()
            .partition(|c| c.phase() == Phase::Before);

        Ok(StateMachine {
            config: self.config,
            states,
            events,
            reader,
            writer,
            before_callbacks,
            after_callbacks,
            action: self.action,
            transaction: self.transaction,
        })
    }
}

impl<O, V: StateValue> Default for MachineBuilder<O, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a definition, accumulating ALL problems.
fn validate_definition<O, V>(
    states: &[StateDef<V>],
    events: &[EventDef],
    callbacks: &[Callback<O, V>],
) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    let mut seen = HashSet::new();
    for state in states {
        if !seen.insert(state.name.as_str()) {
            checks.push(Validation::fail(DefinitionError::DuplicateState(
                state.name.clone(),
            )));
        }
    }

    let mut seen = HashSet::new();
    for event in events {
        if !seen.insert(event.name.as_str()) {
            checks.push(Validation::fail(DefinitionError::DuplicateEvent(
                event.name.clone(),
            )));
        }
    }

    for callback in callbacks {
        let matcher = callback.matcher();
        for event in matcher.event.names() {
            let check = if events.iter().any(|e| &e.name == event) {
                Validation::success(())
            } else {
                Validation::fail(DefinitionError::UnknownEvent {
                    callback: callback.name().to_string(),
                    event: event.clone(),
                })
            };
            checks.push(check);
        }
        for state in matcher.from.names().iter().chain(matcher.to.names()) {
            let check = if states.iter().any(|s| &s.name == state) {
                Validation::success(())
            } else {
                Validation::fail(DefinitionError::UnknownState {
                    callback: callback.name().to_string(),
                    state: state.clone(),
                })
            };
            checks.push(check);
        }
    }

    Validation::all_vec(checks).map(|_| ())
}
