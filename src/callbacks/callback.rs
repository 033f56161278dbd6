//! Callback steps registered on a machine.

use crate::callbacks::matcher::Matcher;
use crate::core::{Guard, TransitionContext};
use crate::transition::TransitionView;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure signalled by a callback body.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Cooperative abort of the remaining steps in the current phase.
    #[error("callback halted the chain")]
    Halt,

    /// Unexpected failure in callback code.
    #[error("{0}")]
    Fault(Box<dyn std::error::Error + Send + Sync>),
}

impl CallbackError {
    pub fn fault(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Fault(error.into())
    }

    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt)
    }
}

/// Type alias for callback bodies.
pub type HookFn<O, V> =
    Arc<dyn Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackType {
    Before,
    Around,
    After,
}

impl fmt::Display for CallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::Around => write!(f, "around"),
            Self::After => write!(f, "after"),
        }
    }
}

/// The two callback lists kept by a machine.
///
/// Before and around callbacks share the `Before` list so their relative
/// registration order is preserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// Which transition outcomes a callback runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuccessCondition {
    Always,
    OnSuccess,
    OnFailure,
}

impl SuccessCondition {
    pub fn matches(&self, success: bool) -> bool {
        match self {
            Self::Always => true,
            Self::OnSuccess => success,
            Self::OnFailure => !success,
        }
    }
}

/// The two halves of an around callback.
///
/// `before_yield` runs where the wrapped callback would call its inner
/// continuation; `after_yield` runs once everything it wraps has finished.
/// When a transition pauses, `after_yield` is deferred until
/// [`Transition::after`](crate::transition::Transition::after) resumes it.
/// Returning `Halt` from `before_yield` is how an around callback declines to
/// run the steps it wraps.
pub struct AroundHooks<O, V> {
    pub before_yield: HookFn<O, V>,
    pub after_yield: HookFn<O, V>,
}

impl<O, V> Clone for AroundHooks<O, V> {
    fn clone(&self) -> Self {
        Self {
            before_yield: Arc::clone(&self.before_yield),
            after_yield: Arc::clone(&self.after_yield),
        }
    }
}

enum Body<O, V> {
    Before(HookFn<O, V>),
    Around(AroundHooks<O, V>),
    After(HookFn<O, V>),
}

/// An ordered, typed unit of work run around a state change.
///
/// Callbacks are stored and walked in registration order. Before and around
/// callbacks share one list; after callbacks live in another.
pub struct Callback<O, V> {
    name: String,
    body: Body<O, V>,
    condition: SuccessCondition,
    matcher: Matcher,
    guards: Vec<Guard<O>>,
}

impl<O, V> Callback<O, V> {
    /// A before callback; runs regardless of outcome.
    pub fn before<F>(body: F) -> Self
    where
        F: Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self::from_body(Body::Before(Arc::new(body)), SuccessCondition::Always)
    }

    /// An after callback; runs on success unless another condition is set.
    pub fn after<F>(body: F) -> Self
    where
        F: Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self::from_body(Body::After(Arc::new(body)), SuccessCondition::OnSuccess)
    }

    /// An around callback split at its yield point.
    pub fn around<B, A>(before_yield: B, after_yield: A) -> Self
    where
        B: Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync + 'static,
        A: Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self::from_hooks(AroundHooks {
            before_yield: Arc::new(before_yield),
            after_yield: Arc::new(after_yield),
        })
    }

    pub fn from_hooks(hooks: AroundHooks<O, V>) -> Self {
        Self::from_body(Body::Around(hooks), SuccessCondition::OnSuccess)
    }

    /// A before or after callback from an already shared body. `Around`
    /// falls back to a before callback since it has no second half.
    pub fn from_hook(kind: CallbackType, hook: HookFn<O, V>) -> Self {
        match kind {
            CallbackType::After => Self::from_body(Body::After(hook), SuccessCondition::OnSuccess),
            CallbackType::Before | CallbackType::Around => {
                Self::from_body(Body::Before(hook), SuccessCondition::Always)
            }
        }
    }

    fn from_body(body: Body<O, V>, condition: SuccessCondition) -> Self {
        let name = match &body {
            Body::Before(_) => CallbackType::Before,
            Body::Around(_) => CallbackType::Around,
            Body::After(_) => CallbackType::After,
        }
        .to_string();
        Self {
            name,
            body,
            condition,
            matcher: Matcher::default(),
            guards: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Set the outcome this callback runs on. Only around and after
    /// callbacks consult it; before callbacks run ahead of the action and
    /// always apply.
    pub fn with_condition(mut self, condition: SuccessCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_guard(mut self, guard: Guard<O>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The list this callback is stored in.
    pub fn phase(&self) -> Phase {
        match self.kind() {
            CallbackType::Before | CallbackType::Around => Phase::Before,
            CallbackType::After => Phase::After,
        }
    }

    pub fn kind(&self) -> CallbackType {
        match self.body {
            Body::Before(_) => CallbackType::Before,
            Body::Around(_) => CallbackType::Around,
            Body::After(_) => CallbackType::After,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn success_condition(&self) -> SuccessCondition {
        self.condition
    }

    /// Check the `(event, from, to)` matcher (pure).
    pub fn matches(&self, context: &TransitionContext) -> bool {
        self.matcher.matches(context)
    }

    pub fn matches_success_condition(&self, success: bool) -> bool {
        self.condition.matches(success)
    }

    /// Check every guard against the object (pure).
    pub fn allows(&self, object: &O) -> bool {
        self.guards.iter().all(|g| g.check(object))
    }

    /// Run the callback body; for around callbacks this is the half before
    /// the yield point.
    pub(crate) fn invoke(
        &self,
        object: &mut O,
        view: &TransitionView<'_, V>,
    ) -> Result<(), CallbackError> {
        match &self.body {
            Body::Before(hook) | Body::After(hook) => hook(object, view),
            Body::Around(hooks) => (hooks.before_yield)(object, view),
        }
    }

    /// Run the half of an around callback after its yield point.
    pub(crate) fn invoke_after_yield(
        &self,
        object: &mut O,
        view: &TransitionView<'_, V>,
    ) -> Result<(), CallbackError> {
        match &self.body {
            Body::Around(hooks) => (hooks.after_yield)(object, view),
            Body::Before(_) | Body::After(_) => Ok(()),
        }
    }
}

impl<O, V> fmt::Debug for Callback<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("condition", &self.condition)
            .field("matcher", &self.matcher)
            .field("guards", &self.guards.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::NameFilter;
    use crate::core::EventDef;

    struct Lamp {
        log: Vec<String>,
        locked: bool,
    }

    fn view<'t>(
        context: &'t TransitionContext,
        event: &'t EventDef,
        from: &'t u8,
        to: &'t u8,
    ) -> TransitionView<'t, u8> {
        TransitionView {
            context,
            attribute: "state",
            event,
            from,
            to,
            args: &[],
            result: None,
            success: true,
        }
    }

    #[test]
    fn default_conditions_per_kind() {
        let before: Callback<Lamp, u8> = Callback::before(|_, _| Ok(()));
        let after: Callback<Lamp, u8> = Callback::after(|_, _| Ok(()));
        let around: Callback<Lamp, u8> = Callback::around(|_, _| Ok(()), |_, _| Ok(()));

        assert_eq!(before.success_condition(), SuccessCondition::Always);
        assert_eq!(after.success_condition(), SuccessCondition::OnSuccess);
        assert_eq!(around.success_condition(), SuccessCondition::OnSuccess);
        assert_eq!(around.kind(), CallbackType::Around);
        assert_eq!(around.name(), "around");
    }

    #[test]
    fn success_condition_matches_outcome() {
        assert!(SuccessCondition::Always.matches(true));
        assert!(SuccessCondition::Always.matches(false));
        assert!(SuccessCondition::OnSuccess.matches(true));
        assert!(!SuccessCondition::OnSuccess.matches(false));
        assert!(SuccessCondition::OnFailure.matches(false));
        assert!(!SuccessCondition::OnFailure.matches(true));
    }

    #[test]
    fn guards_must_all_allow() {
        let callback: Callback<Lamp, u8> = Callback::before(|_, _| Ok(()))
            .with_guard(Guard::unless(|l: &Lamp| l.locked))
            .with_guard(Guard::new(|l: &Lamp| l.log.is_empty()));

        let mut lamp = Lamp {
            log: Vec::new(),
            locked: false,
        };
        assert!(callback.allows(&lamp));

        lamp.locked = true;
        assert!(!callback.allows(&lamp));
    }

    #[test]
    fn around_halves_invoke_separately() {
        let callback: Callback<Lamp, u8> = Callback::around(
            |l: &mut Lamp, _| {
                l.log.push("pre".to_string());
                Ok(())
            },
            |l: &mut Lamp, _| {
                l.log.push("post".to_string());
                Ok(())
            },
        );
        let context = TransitionContext::new("switch_on", "off", "on");
        let event = EventDef::new("switch_on");
        let mut lamp = Lamp {
            log: Vec::new(),
            locked: false,
        };

        callback.invoke(&mut lamp, &view(&context, &event, &0, &1)).unwrap();
        assert_eq!(lamp.log, vec!["pre"]);
        callback
            .invoke_after_yield(&mut lamp, &view(&context, &event, &0, &1))
            .unwrap();
        assert_eq!(lamp.log, vec!["pre", "post"]);
    }

    #[test]
    fn matcher_filters_context() {
        let callback: Callback<Lamp, u8> = Callback::after(|_, _| Ok(())).with_matcher(Matcher {
            event: NameFilter::only(["switch_on"]),
            ..Matcher::default()
        });

        assert!(callback.matches(&TransitionContext::new("switch_on", "off", "on")));
        assert!(!callback.matches(&TransitionContext::new("switch_off", "on", "off")));
    }

    #[test]
    fn fault_wraps_message() {
        let error = CallbackError::fault("bulb missing");
        assert_eq!(error.to_string(), "bulb missing");
        assert!(!error.is_halt());
        assert!(CallbackError::Halt.is_halt());
    }
}
