//! Before, around and after callback steps.
//!
//! A callback pairs a body with the conditions under which it applies:
//! - a [`Matcher`] over the transition's `(event, from, to)` names
//! - a [`SuccessCondition`] over the transition's outcome
//! - optional [`Guard`](crate::core::Guard)s over the object
//!
//! Around callbacks are split at their yield point into two hooks so the
//! second half can be deferred and resumed later.

mod callback;
mod matcher;

pub use callback::{
    AroundHooks, Callback, CallbackError, CallbackType, HookFn, Phase, SuccessCondition,
};
pub use matcher::{Matcher, NameFilter};
