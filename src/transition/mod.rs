//! Transitions: one attempted state change for one attribute of one object.
//!
//! A [`Transition`] borrows its machine definition and runs the machine's
//! callbacks around a state change:
//!
//! 1. Before and around callbacks, in registration order.
//! 2. The action body, which normally persists the new state and runs the
//!    machine action.
//! 3. The second halves of around callbacks, innermost first.
//! 4. After callbacks, in registration order.
//!
//! When callbacks run with after callbacks disabled (as `perform` does
//! inside a transaction) the second halves of around callbacks are paused
//! instead, and resumed by [`Transition::after`].
//!
//! The object is never stored. Every operation that reads or writes it takes
//! it as `&mut O` for the duration of the call.

mod chain;
mod error;
mod suspension;
mod view;

pub use error::{LookupError, TransitionError};
pub use view::{TransitionAttributes, TransitionView};

use crate::callbacks::CallbackError;
use crate::core::{EventDef, StateDef, StateValue, TransitionContext};
use crate::machine::{ActionOutcome, Machine};
use chain::BeforeOutcome;
use serde_json::Value;
use std::fmt;
use suspension::Suspension;
use tracing::debug;

/// Mutable execution state. Cleared as a whole by [`Transition::reset`].
#[derive(Debug, Default)]
struct ExecutionState {
    before_run: bool,
    persisted: bool,
    after_run: bool,
    result: Option<Value>,
    success: bool,
    args: Vec<Value>,
    transient: bool,
}

/// One attempted state change, driven by one event.
pub struct Transition<'m, O, V: StateValue> {
    machine: &'m dyn Machine<O, V>,
    attribute: String,
    event: EventDef,
    from_state: StateDef<V>,
    to_state: StateDef<V>,
    /// Value written back by `rollback`.
    from: V,
    context: TransitionContext,
    run: ExecutionState,
    suspension: Suspension,
}

impl<'m, O, V: StateValue> Transition<'m, O, V> {
    /// Create a transition for `event` moving `object` from `from` to `to`.
    ///
    /// With `read_current_state` the from-value is read from the object's
    /// attribute; otherwise the from-state's defined value is used.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the event or either state is not defined
    /// on the machine.
    pub fn new(
        object: &O,
        machine: &'m dyn Machine<O, V>,
        event: &str,
        from: &str,
        to: &str,
        read_current_state: bool,
    ) -> Result<Self, LookupError> {
        let event = machine.fetch_event(event)?;
        let from_state = machine.fetch_state(from)?;
        let to_state = machine.fetch_state(to)?;

        let from = if read_current_state {
            machine.read(object)
        } else {
            from_state.value.clone()
        };
        let context = TransitionContext::new(&event.name, &from_state.name, &to_state.name);

        Ok(Self {
            machine,
            attribute: machine.attribute().to_string(),
            event,
            from_state,
            to_state,
            from,
            context,
            run: ExecutionState::default(),
            suspension: Suspension::default(),
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn event(&self) -> &str {
        &self.event.name
    }

    pub fn qualified_event(&self) -> &str {
        &self.event.qualified_name
    }

    /// The from-value this transition rolls back to.
    pub fn from(&self) -> &V {
        &self.from
    }

    pub fn from_name(&self) -> &str {
        &self.from_state.name
    }

    pub fn qualified_from_name(&self) -> &str {
        &self.from_state.qualified_name
    }

    /// The value written by [`persist`](Self::persist).
    pub fn to(&self) -> &V {
        &self.to_state.value
    }

    pub fn to_name(&self) -> &str {
        &self.to_state.name
    }

    pub fn qualified_to_name(&self) -> &str {
        &self.to_state.qualified_name
    }

    /// Whether the from and to states are the same state.
    pub fn loopback(&self) -> bool {
        self.context.is_loopback()
    }

    pub fn context(&self) -> &TransitionContext {
        &self.context
    }

    /// Attribute snapshot for introspection and logging.
    pub fn attributes(&self) -> TransitionAttributes<V> {
        TransitionAttributes {
            attribute: self.attribute.clone(),
            event: self.event.name.clone(),
            from: self.from.clone(),
            from_name: self.from_state.name.clone(),
            to: self.to_state.value.clone(),
            to_name: self.to_state.name.clone(),
        }
    }

    pub fn args(&self) -> &[Value] {
        &self.run.args
    }

    pub fn result(&self) -> Option<&Value> {
        self.run.result.as_ref()
    }

    /// Outcome of the last action body.
    pub fn success(&self) -> bool {
        self.run.success
    }

    pub fn transient(&self) -> bool {
        self.run.transient
    }

    pub fn set_transient(&mut self, transient: bool) {
        self.run.transient = transient;
    }

    pub fn is_persisted(&self) -> bool {
        self.run.persisted
    }

    /// Whether around callbacks are waiting for [`after`](Self::after).
    pub fn is_paused(&self) -> bool {
        self.suspension.is_paused()
    }

    /// Run the whole transition with no arguments, running the machine
    /// action.
    pub fn perform(&mut self, object: &mut O) -> Result<bool, TransitionError> {
        self.perform_with(object, Vec::new(), true)
    }

    /// Run callbacks, persist the new state and (if `run_action`) the machine
    /// action. Returns whether the attempt succeeded.
    ///
    /// When the machine uses transactions, the before phase runs inside
    /// [`Machine::within_transaction`] with around callbacks paused, and the
    /// after phase runs once the transaction has committed. A failed attempt
    /// rolls the attribute back.
    ///
    /// # Errors
    ///
    /// Callback and action faults, and performing a paused transition, are
    /// returned as [`TransitionError`]. Halts are not errors; they make this
    /// return `Ok(false)`.
    pub fn perform_with(
        &mut self,
        object: &mut O,
        args: Vec<Value>,
        run_action: bool,
    ) -> Result<bool, TransitionError> {
        let machine = self.machine;
        let run_after = !machine.use_transactions();
        self.run.args = args;
        debug!(event = %self.context.event, from = %self.context.from, to = %self.context.to, run_after, "performing transition");

        let outcome = machine.within_transaction(object, &mut |o: &mut O| -> Result<bool, TransitionError> {
            let completed =
                self.run_callbacks_with(o, run_after, |t, o| t.run_action_body(o, run_action))?;
            let ok = (completed || self.is_paused()) && self.run.success;
            if !ok {
                self.rollback(o);
            }
            Ok(ok)
        });

        let committed = match outcome {
            Ok(committed) => committed,
            Err(error) => {
                if self.run.persisted || self.is_paused() {
                    self.rollback(object);
                }
                return Err(error);
            }
        };

        if committed && !run_after {
            self.after(object)?;
        } else if !committed && (self.run.persisted || self.is_paused()) {
            self.rollback(object);
        }

        debug!(committed, "transition performed");
        Ok(committed)
    }

    fn run_action_body(
        &mut self,
        object: &mut O,
        run_action: bool,
    ) -> Result<ActionOutcome, TransitionError> {
        self.persist(object);
        if !run_action {
            return Ok(ActionOutcome::default());
        }
        match self.machine.run_action(object, &self.run.args) {
            Ok(outcome) => Ok(outcome),
            Err(CallbackError::Halt) => Ok(ActionOutcome::failure(None)),
            Err(CallbackError::Fault(error)) => Err(TransitionError::ActionFault {
                message: error.to_string(),
            }),
        }
    }

    /// Write the to-value into the attribute. Only the first call per reset
    /// cycle writes.
    pub fn persist(&mut self, object: &mut O) {
        if self.run.persisted {
            return;
        }
        debug!(attribute = %self.attribute, to = %self.to_state.name, "persisting state");
        self.machine.write(object, self.to_state.value.clone());
        self.run.persisted = true;
    }

    /// Reset execution state and write the from-value back into the
    /// attribute.
    pub fn rollback(&mut self, object: &mut O) {
        debug!(attribute = %self.attribute, from = %self.from_state.name, "rolling back state");
        self.reset();
        self.machine.write(object, self.from.clone());
    }

    /// Clear all execution state, including any paused around callbacks, so
    /// the transition can be run again.
    pub fn reset(&mut self) {
        self.run = ExecutionState::default();
        self.suspension.clear();
    }

    /// Run callbacks with after callbacks enabled and no action body.
    pub fn run_callbacks(&mut self, object: &mut O) -> Result<bool, TransitionError> {
        self.run_callbacks_with(object, true, |_, _| Ok(ActionOutcome::default()))
    }

    /// Run before and around callbacks, then `action`, then (if `run_after`)
    /// the second halves of around callbacks and the after callbacks.
    ///
    /// Returns whether the before phase completed. With `run_after` false and
    /// around callbacks present, their second halves are paused and this
    /// returns `Ok(false)`; [`after`](Self::after) resumes them. After
    /// callbacks still run on failure so failure callbacks observe it.
    ///
    /// Once the before phase has completed, later calls only run `action`
    /// until the transition is reset.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyPaused`] if the transition is
    /// paused, and propagates callback faults from the before phase and
    /// from `action`.
    pub fn run_callbacks_with<F>(
        &mut self,
        object: &mut O,
        run_after: bool,
        action: F,
    ) -> Result<bool, TransitionError>
    where
        F: FnOnce(&mut Self, &mut O) -> Result<ActionOutcome, TransitionError>,
    {
        if self.suspension.is_paused() {
            return Err(TransitionError::AlreadyPaused);
        }
        self.run.success = false;

        let outcome = self.run_before(object, run_after, action)?;
        debug!(?outcome, before_run = self.run.before_run, "before phase finished");

        if outcome == BeforeOutcome::Completed && (run_after || !self.run.success) {
            self.after(object)?;
        }

        Ok(self.run.before_run)
    }

    /// Resume paused around callbacks, then run after callbacks. Runs at most
    /// once per reset cycle.
    ///
    /// If a resumed second half halts, after callbacks are skipped. Halts and
    /// faults in after callbacks never escape.
    ///
    /// # Errors
    ///
    /// A fault raised by a resumed second half is returned here.
    pub fn after(&mut self, object: &mut O) -> Result<(), TransitionError> {
        if self.run.after_run {
            return Ok(());
        }

        if self.resume(object)? {
            self.run_after_callbacks(object);
        }
        self.run.after_run = true;
        Ok(())
    }
}

impl<O, V: StateValue> fmt::Debug for Transition<'_, O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("attribute", &self.attribute)
            .field("event", &self.event.name)
            .field("from", &self.from_state.name)
            .field("to", &self.to_state.name)
            .field("run", &self.run)
            .field("suspension", &self.suspension)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Callback;
    use crate::machine::StateMachine;

    #[derive(Debug, Default)]
    struct Vehicle {
        state: String,
        log: Vec<String>,
    }

    impl Vehicle {
        fn parked() -> Self {
            Self {
                state: "parked".to_string(),
                log: Vec::new(),
            }
        }
    }

    fn log(
        entry: &'static str,
    ) -> impl Fn(&mut Vehicle, &TransitionView<'_, String>) -> Result<(), CallbackError>
           + Send
           + Sync
           + 'static {
        move |v: &mut Vehicle, _: &TransitionView<'_, String>| {
            v.log.push(entry.to_string());
            Ok(())
        }
    }

    fn machine(callbacks: Vec<Callback<Vehicle, String>>) -> StateMachine<Vehicle, String> {
        callbacks
            .into_iter()
            .fold(
                StateMachine::builder()
                    .state("parked", "parked".to_string())
                    .state("idling", "idling".to_string())
                    .event("ignite")
                    .event("park")
                    .reader(|v: &Vehicle| v.state.clone())
                    .writer(|v: &mut Vehicle, value| v.state = value),
                |builder, callback| builder.add_callback(callback),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn unknown_names_fail_at_construction() {
        let machine = machine(Vec::new());
        let vehicle = Vehicle::parked();

        let result = Transition::new(&vehicle, &machine, "fly", "parked", "idling", false);
        assert!(matches!(result, Err(LookupError::UnknownEvent(_))));

        let result = Transition::new(&vehicle, &machine, "ignite", "parked", "flying", false);
        assert!(matches!(result, Err(LookupError::UnknownState(_))));
    }

    #[test]
    fn from_value_can_be_read_from_object() {
        let machine = machine(Vec::new());
        let vehicle = Vehicle {
            state: "idling".to_string(),
            log: Vec::new(),
        };

        let read = Transition::new(&vehicle, &machine, "ignite", "parked", "idling", true).unwrap();
        assert_eq!(read.from(), "idling");

        let defined =
            Transition::new(&vehicle, &machine, "ignite", "parked", "idling", false).unwrap();
        assert_eq!(defined.from(), "parked");
    }

    #[test]
    fn persist_writes_once_per_cycle() {
        let machine = machine(Vec::new());
        let mut vehicle = Vehicle::parked();
        let mut transition =
            Transition::new(&vehicle, &machine, "ignite", "parked", "idling", false).unwrap();

        transition.persist(&mut vehicle);
        assert_eq!(vehicle.state, "idling");

        vehicle.state = "parked".to_string();
        transition.persist(&mut vehicle);
        assert_eq!(vehicle.state, "parked");

        transition.reset();
        transition.persist(&mut vehicle);
        assert_eq!(vehicle.state, "idling");
    }

    #[test]
    fn rollback_restores_from_value_and_clears_state() {
        let machine = machine(Vec::new());
        let mut vehicle = Vehicle::parked();
        let mut transition =
            Transition::new(&vehicle, &machine, "ignite", "parked", "idling", false).unwrap();

        transition.set_transient(true);
        transition.persist(&mut vehicle);
        transition.rollback(&mut vehicle);

        assert_eq!(vehicle.state, "parked");
        assert!(!transition.is_persisted());
        assert!(!transition.transient());
    }

    #[test]
    fn run_callbacks_walks_every_phase() {
        let machine = machine(vec![
            Callback::before(log("before")),
            Callback::around(log("around:pre"), log("around:post")),
            Callback::after(log("after")),
        ]);
        let mut vehicle = Vehicle::parked();
        let mut transition =
            Transition::new(&vehicle, &machine, "ignite", "parked", "idling", false).unwrap();

        assert!(transition.run_callbacks(&mut vehicle).unwrap());
        assert!(transition.success());
        assert_eq!(
            vehicle.log,
            vec!["before", "around:pre", "around:post", "after"]
        );
    }

    #[test]
    fn before_phase_runs_once_until_reset() {
        let machine = machine(vec![Callback::before(log("before"))]);
        let mut vehicle = Vehicle::parked();
        let mut transition =
            Transition::new(&vehicle, &machine, "ignite", "parked", "idling", false).unwrap();

        assert!(transition.run_callbacks(&mut vehicle).unwrap());
        let mut actions = 0;
        assert!(transition
            .run_callbacks_with(&mut vehicle, true, |_, _| {
                actions += 1;
                Ok(ActionOutcome::success(Some(Value::from(7))))
            })
            .unwrap());
        assert_eq!(vehicle.log, vec!["before"]);
        assert_eq!(actions, 1);
        assert_eq!(transition.result(), Some(&Value::from(7)));

        transition.reset();
        transition.run_callbacks(&mut vehicle).unwrap();
        assert_eq!(vehicle.log, vec!["before", "before"]);
    }

    #[test]
    fn paused_transition_rejects_another_run() {
        let machine = machine(vec![Callback::around(log("pre"), log("post"))]);
        let mut vehicle = Vehicle::parked();
        let mut transition =
            Transition::new(&vehicle, &machine, "ignite", "parked", "idling", false).unwrap();

        assert!(!transition
            .run_callbacks_with(&mut vehicle, false, |_, _| Ok(ActionOutcome::default()))
            .unwrap());
        assert!(transition.is_paused());
        assert!(matches!(
            transition.run_callbacks(&mut vehicle),
            Err(TransitionError::AlreadyPaused)
        ));

        transition.after(&mut vehicle).unwrap();
        assert!(!transition.is_paused());
        assert_eq!(vehicle.log, vec!["pre", "post"]);
    }

    #[test]
    fn attributes_snapshot() {
        let machine = machine(Vec::new());
        let vehicle = Vehicle::parked();
        let transition =
            Transition::new(&vehicle, &machine, "park", "idling", "parked", false).unwrap();

        let attributes = transition.attributes();
        assert_eq!(attributes.attribute, "state");
        assert_eq!(attributes.event, "park");
        assert_eq!(attributes.from, "idling");
        assert_eq!(attributes.to_name, "parked");
        assert!(!transition.loopback());
    }
}
