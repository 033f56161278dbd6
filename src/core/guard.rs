//! Guard predicates for conditional callbacks.
//!
//! Guards are pure boolean functions over the object being transitioned.
//! A callback only runs when all of its guards allow it.

use std::marker::PhantomData;

/// Pure predicate that decides whether a callback applies to an object.
///
/// Guards are evaluated at invocation time, after the callback's
/// `(event, from, to)` matcher has accepted the transition.
///
/// # Example
///
/// ```rust
/// use waypoint::core::Guard;
///
/// struct Vehicle {
///     seatbelt_on: bool,
/// }
///
/// let buckled = Guard::new(|v: &Vehicle| v.seatbelt_on);
///
/// assert!(buckled.check(&Vehicle { seatbelt_on: true }));
/// assert!(!buckled.check(&Vehicle { seatbelt_on: false }));
/// ```
pub struct Guard<O> {
    predicate: Box<dyn Fn(&O) -> bool + Send + Sync>,
    _phantom: PhantomData<fn(&O)>,
}

impl<O> Guard<O> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Create a guard that allows the object when `predicate` rejects it.
    pub fn unless<F>(predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        Self::new(move |object| !predicate(object))
    }

    /// Check if the guard allows this object.
    pub fn check(&self, object: &O) -> bool {
        (self.predicate)(object)
    }
}

impl<O> std::fmt::Debug for Guard<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
