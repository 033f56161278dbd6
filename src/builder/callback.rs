//! Builder for constructing callbacks.

use crate::builder::error::BuildError;
use crate::callbacks::{
    AroundHooks, Callback, CallbackError, CallbackType, HookFn, Matcher, NameFilter,
    SuccessCondition,
};
use crate::core::Guard;
use crate::transition::TransitionView;
use std::sync::Arc;

/// Builder for constructing callbacks with a fluent API.
///
/// # Example
///
/// ```rust
/// use waypoint::builder::CallbackBuilder;
/// use waypoint::callbacks::CallbackType;
///
/// struct Vehicle {
///     log: Vec<String>,
/// }
///
/// let callback = CallbackBuilder::<Vehicle, String>::before()
///     .on(["ignite"])
///     .from(["parked"])
///     .named("log_ignite")
///     .run(|v, _| {
///         v.log.push("igniting".to_string());
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(callback.kind(), CallbackType::Before);
/// assert_eq!(callback.name(), "log_ignite");
/// ```
pub struct CallbackBuilder<O, V> {
    kind: CallbackType,
    name: Option<String>,
    matcher: Matcher,
    condition: Option<SuccessCondition>,
    guards: Vec<Guard<O>>,
    body: Option<HookFn<O, V>>,
    hooks: Option<AroundHooks<O, V>>,
}

impl<O, V> CallbackBuilder<O, V> {
    fn new(kind: CallbackType) -> Self {
        Self {
            kind,
            name: None,
            matcher: Matcher::default(),
            condition: None,
            guards: Vec::new(),
            body: None,
            hooks: None,
        }
    }

    pub fn before() -> Self {
        Self::new(CallbackType::Before)
    }

    pub fn around() -> Self {
        Self::new(CallbackType::Around)
    }

    /// After callback that runs when the transition succeeded.
    pub fn after() -> Self {
        Self::new(CallbackType::After)
    }

    /// After callback that runs when the transition failed.
    pub fn after_failure() -> Self {
        Self::new(CallbackType::After).condition(SuccessCondition::OnFailure)
    }

    /// Restrict to the given events.
    pub fn on<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matcher.event = NameFilter::only(events);
        self
    }

    pub fn except_on<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matcher.event = NameFilter::except(events);
        self
    }

    /// Restrict to transitions leaving the given states.
    pub fn from<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matcher.from = NameFilter::only(states);
        self
    }

    pub fn except_from<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matcher.from = NameFilter::except(states);
        self
    }

    /// Restrict to transitions entering the given states.
    pub fn to<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matcher.to = NameFilter::only(states);
        self
    }

    pub fn except_to<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matcher.to = NameFilter::except(states);
        self
    }

    /// Restrict to loopbacks (`true`) or to real state changes (`false`).
    pub fn loopback(mut self, loopback: bool) -> Self {
        self.matcher.loopback = Some(loopback);
        self
    }

    /// Only run when the predicate holds for the object.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        self.guards.push(Guard::new(predicate));
        self
    }

    /// Only run when the predicate does not hold for the object.
    pub fn unless<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        self.guards.push(Guard::unless(predicate));
        self
    }

    /// Run only on the given outcome. Applies to around and after callbacks;
    /// before callbacks run ahead of the action, so `build` rejects it.
    pub fn condition(mut self, condition: SuccessCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the body of a before or after callback.
    pub fn run<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    /// Set both halves of an around callback.
    pub fn hooks<B, A>(mut self, before_yield: B, after_yield: A) -> Self
    where
        B: Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync + 'static,
        A: Fn(&mut O, &TransitionView<'_, V>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.hooks = Some(AroundHooks {
            before_yield: Arc::new(before_yield),
            after_yield: Arc::new(after_yield),
        });
        self
    }

    /// Build the callback.
    pub fn build(self) -> Result<Callback<O, V>, BuildError> {
        if self.kind == CallbackType::Before && self.condition.is_some() {
            return Err(BuildError::ConditionOnBefore);
        }

        let callback = match self.kind {
            CallbackType::Around => {
                Callback::from_hooks(self.hooks.ok_or(BuildError::MissingBody)?)
            }
            CallbackType::Before => Callback::from_hook(
                CallbackType::Before,
                self.body.ok_or(BuildError::MissingBody)?,
            ),
            CallbackType::After => Callback::from_hook(
                CallbackType::After,
                self.body.ok_or(BuildError::MissingBody)?,
            ),
        };

        let mut callback = callback.with_matcher(self.matcher);
        if let Some(condition) = self.condition {
            callback = callback.with_condition(condition);
        }
        if let Some(name) = self.name {
            callback = callback.named(name);
        }
        for guard in self.guards {
            callback = callback.with_guard(guard);
        }
        Ok(callback)
    }
}
